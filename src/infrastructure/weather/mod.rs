pub mod nws;

pub use nws::NwsWeatherClient;
