use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PassengerClass {
    First,
    Second,
    Third,
}

impl PassengerClass {
    pub fn rank(self) -> u8 {
        match self {
            PassengerClass::First => 1,
            PassengerClass::Second => 2,
            PassengerClass::Third => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PassengerClass::First => "1st Class",
            PassengerClass::Second => "2nd Class",
            PassengerClass::Third => "3rd Class",
        }
    }
}

impl TryFrom<u8> for PassengerClass {
    type Error = u8;

    fn try_from(rank: u8) -> Result<Self, Self::Error> {
        match rank {
            1 => Ok(PassengerClass::First),
            2 => Ok(PassengerClass::Second),
            3 => Ok(PassengerClass::Third),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" => Ok(Gender::Female),
            "male" => Ok(Gender::Male),
            _ => Err(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Port {
    Cherbourg,
    Queenstown,
    Southampton,
}

impl Port {
    pub fn label(self) -> &'static str {
        match self {
            Port::Cherbourg => "Cherbourg",
            Port::Queenstown => "Queenstown",
            Port::Southampton => "Southampton",
        }
    }
}

impl FromStr for Port {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "C" => Ok(Port::Cherbourg),
            "Q" => Ok(Port::Queenstown),
            "S" => Ok(Port::Southampton),
            _ => Err(s.to_string()),
        }
    }
}

pub fn outcome_label(survived: bool) -> &'static str {
    if survived {
        "Survived"
    } else {
        "Did Not Survive"
    }
}

/// One validated row of the passenger CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassengerRecord {
    pub id: u32,
    pub survived: bool,
    pub class: PassengerClass,
    pub name: String,
    pub gender: Gender,
    pub age: Option<f64>,
    pub siblings_spouses: u8,
    pub parents_children: u8,
    pub fare: Option<f64>,
    pub port: Option<Port>,
}

impl PassengerRecord {
    /// Siblings/spouses plus parents/children plus the passenger.
    pub fn family_size(&self) -> u32 {
        u32::from(self.siblings_spouses) + u32::from(self.parents_children) + 1
    }

    /// Numeric view of a column, used by range constraints.
    ///
    /// `None` either because the value is missing or because the column has
    /// no numeric form (gender, port).
    pub fn numeric(&self, column: Column) -> Option<f64> {
        match column {
            Column::Survived => Some(if self.survived { 1.0 } else { 0.0 }),
            Column::Class => Some(f64::from(self.class.rank())),
            Column::Age => self.age,
            Column::SiblingsSpouses => Some(f64::from(self.siblings_spouses)),
            Column::ParentsChildren => Some(f64::from(self.parents_children)),
            Column::Fare => self.fare,
            Column::FamilySize => Some(f64::from(self.family_size())),
            Column::Gender | Column::Port => None,
        }
    }

    /// Display label of a column's value; `None` when the value is missing.
    pub fn label(&self, column: Column) -> Option<String> {
        match column {
            Column::Survived => Some(outcome_label(self.survived).to_string()),
            Column::Class => Some(self.class.label().to_string()),
            Column::Gender => Some(self.gender.label().to_string()),
            Column::Port => self.port.map(|p| p.label().to_string()),
            _ => self.numeric(column).map(|v| v.to_string()),
        }
    }
}

/// Every column a caller may name. Parsing anything else is an
/// [`Error::InvalidColumn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Column {
    Survived,
    Class,
    Gender,
    Age,
    SiblingsSpouses,
    ParentsChildren,
    Fare,
    Port,
    FamilySize,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Gender,
        Column::Class,
        Column::Port,
        Column::Survived,
        Column::Age,
        Column::SiblingsSpouses,
        Column::ParentsChildren,
        Column::Fare,
        Column::FamilySize,
    ];

    pub fn is_categorical(self) -> bool {
        matches!(self, Column::Gender | Column::Class | Column::Port)
    }

    pub fn name(self) -> &'static str {
        match self {
            Column::Survived => "survived",
            Column::Class => "class",
            Column::Gender => "gender",
            Column::Age => "age",
            Column::SiblingsSpouses => "sibsp",
            Column::ParentsChildren => "parch",
            Column::Fare => "fare",
            Column::Port => "embarked",
            Column::FamilySize => "family_size",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let column = match s.trim().to_ascii_lowercase().as_str() {
            "survived" => Column::Survived,
            "class" | "pclass" => Column::Class,
            "gender" | "sex" => Column::Gender,
            "age" => Column::Age,
            "sibsp" => Column::SiblingsSpouses,
            "parch" => Column::ParentsChildren,
            "fare" => Column::Fare,
            "embarked" | "port" => Column::Port,
            "family_size" | "familysize" => Column::FamilySize,
            _ => return Err(Error::InvalidColumn(s.to_string())),
        };
        Ok(column)
    }
}

/// The immutable passenger table every aggregation reads from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassengerTable {
    records: Vec<PassengerRecord>,
    dropped: usize,
}

impl PassengerTable {
    pub fn new(records: Vec<PassengerRecord>, dropped: usize) -> Self {
        Self { records, dropped }
    }

    pub fn records(&self) -> &[PassengerRecord] {
        &self.records
    }

    /// Rows rejected while loading.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PassengerRecord> {
        self.records.iter()
    }
}

impl FromIterator<PassengerRecord> for PassengerTable {
    fn from_iter<I: IntoIterator<Item = PassengerRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect(), 0)
    }
}
