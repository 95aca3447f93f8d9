mod relay;

pub use relay::HttpRelay;
