use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The twelve public-health measures a lookup may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureName {
    ViolentCrimeRate,
    Unemployment,
    ChildrenInPoverty,
    DiabeticScreening,
    MammographyScreening,
    PreventableHospitalStays,
    Uninsured,
    SexuallyTransmittedInfections,
    PhysicalInactivity,
    AdultObesity,
    PrematureDeath,
    DailyFineParticulateMatter,
}

impl MeasureName {
    pub const ALL: [MeasureName; 12] = [
        MeasureName::ViolentCrimeRate,
        MeasureName::Unemployment,
        MeasureName::ChildrenInPoverty,
        MeasureName::DiabeticScreening,
        MeasureName::MammographyScreening,
        MeasureName::PreventableHospitalStays,
        MeasureName::Uninsured,
        MeasureName::SexuallyTransmittedInfections,
        MeasureName::PhysicalInactivity,
        MeasureName::AdultObesity,
        MeasureName::PrematureDeath,
        MeasureName::DailyFineParticulateMatter,
    ];

    /// Name exactly as it appears in the source data.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureName::ViolentCrimeRate => "Violent crime rate",
            MeasureName::Unemployment => "Unemployment",
            MeasureName::ChildrenInPoverty => "Children in poverty",
            MeasureName::DiabeticScreening => "Diabetic screening",
            MeasureName::MammographyScreening => "Mammography screening",
            MeasureName::PreventableHospitalStays => "Preventable hospital stays",
            MeasureName::Uninsured => "Uninsured",
            MeasureName::SexuallyTransmittedInfections => "Sexually transmitted infections",
            MeasureName::PhysicalInactivity => "Physical inactivity",
            MeasureName::AdultObesity => "Adult obesity",
            MeasureName::PrematureDeath => "Premature Death",
            MeasureName::DailyFineParticulateMatter => "Daily fine particulate matter",
        }
    }

    /// All names, comma separated, for error messages.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown measure name '{0}'")]
pub struct UnknownMeasure(pub String);

/// Case-sensitive exact match; no trimming.
impl FromStr for MeasureName {
    type Err = UnknownMeasure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMeasure(s.to_string()))
    }
}

impl fmt::Display for MeasureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MeasureName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
