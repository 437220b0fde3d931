//! Snow accumulation and melt, with radiation-driven PET, for daily models.

pub mod coupled;
pub mod pet;
pub mod snowpack;
pub mod solar;

pub use coupled::{Ccf, CcfConfig, CcfFluxes, CcfGr4j, CcfHbv, CcfKind, CcfSeries, DailyWeather};
pub use pet::Makkink;
pub use snowpack::{Snowpack, SnowpackConfig, SnowStep};
pub use solar::Site;
