/// Forcing series and timestep resolution.
use crate::error::ForcingError;
use crate::snow::{DailyWeather, Site};

/// Temporal resolution of forcing data. Ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Resolution {
    Hourly,
    #[default]
    Daily,
    Monthly,
    Annual,
}

impl Resolution {
    /// Average number of days per timestep.
    pub fn days_per_timestep(self) -> f64 {
        match self {
            Resolution::Hourly => 1.0 / 24.0,
            Resolution::Daily => 1.0,
            Resolution::Monthly => 30.4375,
            Resolution::Annual => 365.25,
        }
    }

    pub fn seconds_per_timestep(self) -> f64 {
        self.days_per_timestep() * 86_400.0
    }
}

/// Validated, immutable forcing for objective evaluation.
///
/// Shared by reference between concurrent evaluations; nothing mutates it
/// after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ForcingContext {
    pub precip: Vec<f64>,
    pub pet: Vec<f64>,
    pub observed: Vec<f64>,
    /// Leading timesteps run but excluded from scoring.
    pub warmup: usize,
    pub resolution: Resolution,
}

impl ForcingContext {
    /// Validates:
    /// - all three series are non-empty and share a length
    /// - precip and pet are finite (observed may hold NaN gaps)
    /// - warmup leaves at least one step to score
    pub fn new(
        precip: Vec<f64>,
        pet: Vec<f64>,
        observed: Vec<f64>,
        warmup: usize,
        resolution: Resolution,
    ) -> Result<Self, ForcingError> {
        if precip.is_empty() {
            return Err(ForcingError::Empty);
        }
        for (series, values) in [("pet", &pet), ("observed", &observed)] {
            if values.len() != precip.len() {
                return Err(ForcingError::LengthMismatch {
                    series,
                    expected: precip.len(),
                    got: values.len(),
                });
            }
        }
        for (series, values) in [("precip", &precip), ("pet", &pet)] {
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(ForcingError::NonFinite { series, index });
            }
        }
        if warmup >= precip.len() {
            return Err(ForcingError::WarmupTooLong {
                warmup,
                len: precip.len(),
            });
        }
        Ok(Self {
            precip,
            pet,
            observed,
            warmup,
            resolution,
        })
    }

    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.precip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precip.is_empty()
    }

    /// Observed values after warmup.
    pub fn scored_observed(&self) -> &[f64] {
        &self.observed[self.warmup..]
    }
}

/// Validated daily weather for the snow-coupled models.
///
/// Depths and observed discharge are in metres per day.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherContext {
    pub weather: Vec<DailyWeather>,
    pub observed: Vec<f64>,
    pub warmup: usize,
    /// Day of year of `weather[0]`.
    pub first_doy: u32,
    pub site: Site,
}

impl WeatherContext {
    /// Same checks as `ForcingContext::new`, over every weather field.
    pub fn new(
        weather: Vec<DailyWeather>,
        observed: Vec<f64>,
        warmup: usize,
        first_doy: u32,
        site: Site,
    ) -> Result<Self, ForcingError> {
        if weather.is_empty() {
            return Err(ForcingError::Empty);
        }
        if observed.len() != weather.len() {
            return Err(ForcingError::LengthMismatch {
                series: "observed",
                expected: weather.len(),
                got: observed.len(),
            });
        }
        for (index, day) in weather.iter().enumerate() {
            let fields = [("tmax", day.tmax), ("tmin", day.tmin), ("rain", day.rain), ("snow", day.snow)];
            if let Some(&(series, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
                return Err(ForcingError::NonFinite { series, index });
            }
        }
        if warmup >= weather.len() {
            return Err(ForcingError::WarmupTooLong {
                warmup,
                len: weather.len(),
            });
        }
        Ok(Self {
            weather,
            observed,
            warmup,
            first_doy,
            site,
        })
    }

    pub fn len(&self) -> usize {
        self.weather.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weather.is_empty()
    }

    /// Observed values after warmup.
    pub fn scored_observed(&self) -> &[f64] {
        &self.observed[self.warmup..]
    }
}
