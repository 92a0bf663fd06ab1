use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::dataset::{Gender, PassengerClass, PassengerRecord, PassengerTable, Port};
use crate::error::{Error, Result, RowDefect};

/// Headers the dashboard cannot work without. `Name` is optional.
const REQUIRED_HEADERS: &[&str] = &[
    "PassengerId",
    "Survived",
    "Pclass",
    "Sex",
    "Age",
    "SibSp",
    "Parch",
    "Fare",
    "Embarked",
];

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "PassengerId")]
    id: u32,
    #[serde(rename = "Survived")]
    survived: u8,
    #[serde(rename = "Pclass")]
    class: u8,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Age")]
    age: Option<f64>,
    #[serde(rename = "SibSp")]
    siblings_spouses: u8,
    #[serde(rename = "Parch")]
    parents_children: u8,
    #[serde(rename = "Fare")]
    fare: Option<f64>,
    #[serde(rename = "Embarked")]
    embarked: Option<String>,
}

/// `f64` parsing accepts `inf` and `NaN`; neither is a usable age or fare.
fn non_negative(
    field: &'static str,
    value: Option<f64>,
) -> std::result::Result<Option<f64>, RowDefect> {
    match value {
        Some(v) if !v.is_finite() => Err(RowDefect::NotFinite { field, value: v }),
        Some(v) if v < 0.0 => Err(RowDefect::Negative { field, value: v }),
        other => Ok(other),
    }
}

impl TryFrom<RawRecord> for PassengerRecord {
    type Error = RowDefect;

    fn try_from(raw: RawRecord) -> std::result::Result<Self, Self::Error> {
        let survived = match raw.survived {
            0 => false,
            1 => true,
            other => return Err(RowDefect::Survived(other)),
        };
        let class = PassengerClass::try_from(raw.class).map_err(RowDefect::Class)?;
        let gender = raw.sex.parse::<Gender>().map_err(RowDefect::Gender)?;
        let port = match raw.embarked.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) => Some(code.parse::<Port>().map_err(RowDefect::Port)?),
        };
        Ok(PassengerRecord {
            id: raw.id,
            survived,
            class,
            name: raw.name,
            gender,
            age: non_negative("age", raw.age)?,
            siblings_spouses: raw.siblings_spouses,
            parents_children: raw.parents_children,
            fare: non_negative("fare", raw.fare)?,
            port,
        })
    }
}

impl PassengerTable {
    /// Loads the passenger CSV at `path`.
    ///
    /// Rows that fail to parse or carry out-of-range values are dropped and
    /// counted; a missing file or a missing required header fails the load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::DataLoad {
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        })?;
        let table = read_table(file, path)?;
        info!(
            path = %path.display(),
            rows = table.len(),
            dropped = table.dropped(),
            "loaded passenger table"
        );
        Ok(table)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        read_table(reader, Path::new("<reader>"))
    }
}

fn read_table<R: io::Read>(reader: R, path: &Path) -> Result<PassengerTable> {
    let load_error = |source: csv::Error| Error::DataLoad {
        path: PathBuf::from(path),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(load_error)?.clone();
    if let Some(missing) = REQUIRED_HEADERS
        .iter()
        .find(|required| !headers.iter().any(|h| h == **required))
    {
        return Err(Error::InvalidColumn((*missing).to_string()));
    }

    let mut records = Vec::new();
    let mut dropped = 0;
    for result in rdr.deserialize::<RawRecord>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) if e.is_io_error() => return Err(load_error(e)),
            Err(e) => {
                debug!(error = %e, "dropping unparseable row");
                dropped += 1;
                continue;
            }
        };
        let id = raw.id;
        match PassengerRecord::try_from(raw) {
            Ok(record) => records.push(record),
            Err(defect) => {
                debug!(passenger = id, %defect, "dropping row");
                dropped += 1;
            }
        }
    }

    Ok(PassengerTable::new(records, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n";

    fn table(rows: &str) -> Result<PassengerTable> {
        PassengerTable::from_reader(format!("{HEADER}{rows}").as_bytes())
    }

    #[test]
    fn parses_kaggle_rows() {
        let table = table(concat!(
            "1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S\n",
            "2,1,1,\"Cumings, Mrs. John Bradley\",female,38,1,0,PC 17599,71.2833,C85,C\n",
            "6,0,3,\"Moran, Mr. James\",male,,0,0,330877,8.4583,,Q\n",
            "62,1,1,\"Icard, Miss. Amelie\",female,38,0,0,113572,80,B28,\n",
        ))
        .unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.dropped(), 0);
        let braund = &table.records()[0];
        assert_eq!(braund.name, "Braund, Mr. Owen Harris");
        assert_eq!(braund.class, PassengerClass::Third);
        assert_eq!(braund.gender, Gender::Male);
        assert_eq!(braund.fare, Some(7.25));
        assert_eq!(table.records()[1].port, Some(Port::Cherbourg));
        assert_eq!(table.records()[2].age, None);
        assert_eq!(table.records()[3].port, None);
    }

    #[test]
    fn malformed_rows_are_dropped_not_fatal() {
        let table = table(concat!(
            "1,0,3,A,male,22,1,0,T,7.25,,S\n",
            "2,1,4,B,female,38,1,0,T,71.28,,C\n",
            "3,1,3,C,unknown,26,0,0,T,7.92,,S\n",
            "4,2,1,D,female,35,1,0,T,53.1,,S\n",
            "5,0,3,E,male,abc,0,0,T,8.05,,S\n",
            "6,0,3,F,male,30,0,0,T,-1,,S\n",
            "7,0,1,G,male,54,0,0,T,51.86,,X\n",
            "8,1,2,H,female,14,1,0,T,30.07,,C\n",
            "9,1,2,I,female,inf,0,0,T,13,,S\n",
            "10,0,3,J,male,30,0,0,T,infinity,,S\n",
            "11,0,3,K,male,NaN,0,0,T,8.05,,S\n",
        ))
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.dropped(), 9);
        assert_eq!(
            table.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 8]
        );
    }

    #[test]
    fn non_finite_numbers_are_row_defects() {
        assert_eq!(
            non_negative("age", Some(f64::INFINITY)),
            Err(RowDefect::NotFinite {
                field: "age",
                value: f64::INFINITY
            })
        );
        assert!(matches!(
            non_negative("fare", Some(f64::NAN)),
            Err(RowDefect::NotFinite { field: "fare", .. })
        ));
        assert_eq!(
            non_negative("fare", Some(-1.0)),
            Err(RowDefect::Negative {
                field: "fare",
                value: -1.0
            })
        );
        assert_eq!(non_negative("age", Some(0.0)), Ok(Some(0.0)));
        assert_eq!(non_negative("age", None), Ok(None));
    }

    #[test]
    fn name_column_is_optional() {
        let csv = "PassengerId,Survived,Pclass,Sex,Age,SibSp,Parch,Fare,Embarked\n\
                   1,1,2,female,29,0,0,13,S\n";
        let table = PassengerTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].name, "");
    }

    #[test]
    fn missing_required_header_is_fatal() {
        let csv = "PassengerId,Survived,Pclass,Sex,Age,SibSp,Parch,Fare\n1,1,2,female,29,0,0,13\n";
        let err = PassengerTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidColumn(name) if name == "Embarked"));
    }

    #[test]
    fn loads_the_bundled_sample() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/sample.csv");
        let table = PassengerTable::load(path).unwrap();
        assert_eq!(table.len(), 20);
        assert_eq!(table.dropped(), 0);
        assert_eq!(table.iter().filter(|r| r.survived).count(), 10);
        assert_eq!(table.iter().filter(|r| r.age.is_none()).count(), 3);
        assert_eq!(table.records()[15].name, "Hewlett, Mrs. (Mary D Kingcome)");
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = PassengerTable::load("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }
}
