/// HBV conceptual model.
///
/// Optional lake, soil moisture, upper and lower zones, and a triangular
/// transfer function on generated runoff.
///
/// Bergström, S., 1992. The HBV model: its structure and applications. SMHI RH 4.
pub mod model;
pub mod params;
pub mod processes;

pub use model::Hbv;
pub use params::HbvConfig;
