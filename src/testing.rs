use crate::dataset::{Gender, PassengerClass, PassengerRecord, PassengerTable, Port};

/// (gender, class, survived, died) cells of the 891-passenger training set.
const CROSS_TAB: [(Gender, PassengerClass, usize, usize); 6] = [
    (Gender::Female, PassengerClass::First, 91, 3),
    (Gender::Female, PassengerClass::Second, 70, 6),
    (Gender::Female, PassengerClass::Third, 72, 72),
    (Gender::Male, PassengerClass::First, 45, 77),
    (Gender::Male, PassengerClass::Second, 17, 91),
    (Gender::Male, PassengerClass::Third, 47, 300),
];

/// Deterministic stand-in for the Titanic CSV with the real gender and class
/// survival counts. Other attributes vary with the row index; every fifth
/// passenger has no age and two have no port.
pub fn titanic_like_table() -> PassengerTable {
    let mut records = Vec::with_capacity(891);
    for (gender, class, survived, died) in CROSS_TAB {
        let outcomes = std::iter::repeat(true)
            .take(survived)
            .chain(std::iter::repeat(false).take(died));
        for outcome in outcomes {
            let i = records.len();
            records.push(PassengerRecord {
                id: i as u32 + 1,
                survived: outcome,
                class,
                name: format!("Passenger {}", i + 1),
                gender,
                age: (i % 5 != 0).then(|| ((i * 7) % 75) as f64 + 0.5),
                siblings_spouses: (i % 4) as u8,
                parents_children: (i % 3) as u8,
                fare: match i {
                    100 => None,
                    _ if i % 97 == 0 => Some(0.0),
                    _ => Some(fare_for(class, i)),
                },
                port: match i {
                    61 | 829 => None,
                    _ if i % 10 < 2 => Some(Port::Cherbourg),
                    _ if i % 10 == 2 => Some(Port::Queenstown),
                    _ => Some(Port::Southampton),
                },
            });
        }
    }
    PassengerTable::new(records, 0)
}

fn fare_for(class: PassengerClass, i: usize) -> f64 {
    match class {
        PassengerClass::First => 30.0 + (i % 50) as f64,
        PassengerClass::Second => 10.0 + (i % 20) as f64,
        PassengerClass::Third => 5.0 + (i % 10) as f64 * 0.5,
    }
}

pub fn passenger(id: u32, gender: Gender, class: PassengerClass, survived: bool) -> PassengerRecord {
    PassengerRecord {
        id,
        survived,
        class,
        name: format!("Passenger {id}"),
        gender,
        age: Some(30.0),
        siblings_spouses: 0,
        parents_children: 0,
        fare: Some(10.0),
        port: Some(Port::Southampton),
    }
}
