/// rainrun-core: lumped conceptual rainfall-runoff models.
///
/// Eight base models share one contract (`Lumper`): build from a validated
/// configuration, step once per timestep with precipitation and PET, read
/// back actual ET, runoff and recharge. They are assembled from a linear
/// reservoir, an exposed reservoir with ET/percolation partitioning and a
/// finite impulse-response routing buffer. GR4J and HBV also come wrapped
/// in a cold-content snowpack driven by daily temperature and radiation.
pub mod calibration;
pub mod error;
pub mod exposed;
pub mod forcing;
pub mod metrics;
pub mod model;
pub mod reservoir;
pub mod routing;
pub mod sampling;
pub mod snow;
pub mod traits;
mod validate;

pub mod atkinson;
pub mod dawdy_odonnell;
pub mod gr4j;
pub mod hbv;
pub mod multilayer;
pub mod quinn;
pub mod sixpar;
pub mod splr;

pub use error::{ConstructionError, ForcingError, ModelError, ModelResult, NumericalInconsistency};
pub use forcing::{ForcingContext, Resolution, WeatherContext};
pub use model::{AnyModel, ModelKind};
pub use traits::{Lumper, ModelConfig, RechargeRole, StepFluxes, StepFluxesSeries};
