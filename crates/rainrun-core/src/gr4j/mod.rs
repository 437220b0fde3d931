/// GR4J, Génie Rural à 4 paramètres Journalier.
///
/// Production store, two unit hydrographs and a non-linear routing store,
/// with a groundwater exchange term.
///
/// Perrin C., C. Michel, V. Andreassian, 2003. Journal of Hydrology 279, 275-289.
pub mod model;
pub mod params;
pub mod processes;

pub use model::Gr4j;
pub use params::Gr4jConfig;
