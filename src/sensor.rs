use clap::ValueEnum;

/// Sensor formats with their conventional circle of confusion
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Sensor {
    #[default]
    FullFrame,
    ApsH,
    ApsC,
    ApsCCanon,
    MicroFourThirds,
    OneInch,
    MediumFormat,
    LargeFormat,
}

impl Sensor {
    pub const ALL: [Sensor; 8] = [
        Sensor::FullFrame,
        Sensor::ApsH,
        Sensor::ApsC,
        Sensor::ApsCCanon,
        Sensor::MicroFourThirds,
        Sensor::OneInch,
        Sensor::MediumFormat,
        Sensor::LargeFormat,
    ];

    /// Circle of confusion in millimetres
    pub fn circle_of_confusion_mm(self) -> f64 {
        match self {
            Sensor::FullFrame => 0.030,
            Sensor::ApsH => 0.025,
            Sensor::ApsC => 0.020,
            Sensor::ApsCCanon => 0.019,
            Sensor::MicroFourThirds => 0.015,
            Sensor::OneInch => 0.011,
            Sensor::MediumFormat => 0.043,
            Sensor::LargeFormat => 0.100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sensor::FullFrame => "Full Frame",
            Sensor::ApsH => "APS-H",
            Sensor::ApsC => "APS-C",
            Sensor::ApsCCanon => "APS-C (Canon)",
            Sensor::MicroFourThirds => "Micro 4/3",
            Sensor::OneInch => "1\"",
            Sensor::MediumFormat => "Medium Format",
            Sensor::LargeFormat => "Large Format 4x5",
        }
    }

    /// Next format in the cycle used by the interactive controls
    pub fn next(self) -> Sensor {
        let index = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}
