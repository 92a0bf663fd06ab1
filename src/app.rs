use chrono::{DateTime, Local};
use crossterm::event::KeyCode;
use tracing::debug;

use crate::aggregator::{
    age_group_rate, fare_quartile_rate, family_size_rate, filter_by_selection, rate_by_category,
    AgeBucket, CategoryRate,
};
use crate::dataset::{Column, Gender, PassengerClass, PassengerTable};
use crate::error::Result;
use crate::report::Report;
use crate::selection::{Constraint, Selection};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Tab {
    Overview,
    Explorer,
    Breakdown,
    About,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Explorer, Tab::Breakdown, Tab::About];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Explorer => "Explorer",
            Tab::Breakdown => "Breakdown",
            Tab::About => "About",
        }
    }

    fn next(self) -> Self {
        Tab::ALL[(usize::from(self) + 1) % Tab::ALL.len()]
    }
}

impl From<Tab> for usize {
    fn from(input: Tab) -> usize {
        match input {
            Tab::Overview => 0,
            Tab::Explorer => 1,
            Tab::Breakdown => 2,
            Tab::About => 3,
        }
    }
}

/// Inclusive age windows offered by the explorer.
const AGE_WINDOWS: [(f64, Option<f64>); 5] = [
    (0.0, Some(12.0)),
    (13.0, Some(18.0)),
    (19.0, Some(35.0)),
    (36.0, Some(50.0)),
    (51.0, None),
];

fn cycle<T: Copy + PartialEq>(current: Option<T>, options: &[T]) -> Option<T> {
    match current.and_then(|c| options.iter().position(|o| *o == c)) {
        None => options.first().copied(),
        Some(i) => options.get(i + 1).copied(),
    }
}

/// Filters of the explorer tab; `None` means "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrillDown {
    pub class: Option<PassengerClass>,
    pub gender: Option<Gender>,
    pub survived: Option<bool>,
    pub age_window: Option<usize>,
}

impl DrillDown {
    pub fn selection(&self) -> Selection {
        let mut selection = Selection::new();
        if let Some(class) = self.class {
            selection = selection.with(Constraint::equals(Column::Class, class.rank().to_string()));
        }
        if let Some(gender) = self.gender {
            selection = selection.with(Constraint::equals(Column::Gender, gender.label()));
        }
        if let Some(survived) = self.survived {
            let value = if survived { "1" } else { "0" };
            selection = selection.with(Constraint::equals(Column::Survived, value));
        }
        if let Some((min, max)) = self.age_window.and_then(|i| AGE_WINDOWS.get(i)) {
            selection = selection.with(Constraint::range(Column::Age, Some(*min), *max));
        }
        selection
    }

    pub fn describe(&self) -> String {
        let age = match self.age_window.and_then(|i| AGE_WINDOWS.get(i)) {
            Some((min, Some(max))) => format!("{min}-{max}"),
            Some((min, None)) => format!("{min}+"),
            None => "any".to_string(),
        };
        format!(
            "class: {}  gender: {}  outcome: {}  age: {age}",
            self.class.map_or("any", PassengerClass::label),
            self.gender.map_or("any", Gender::label),
            match self.survived {
                Some(true) => "survived",
                Some(false) => "died",
                None => "any",
            },
        )
    }
}

/// Everything the breakdown tab shows for the chosen column.
#[derive(Debug)]
pub struct Breakdown {
    pub column: Column,
    pub rates: Result<Vec<CategoryRate>>,
    pub family_size: Vec<CategoryRate>,
    pub age_groups: Vec<AgeBucket>,
    pub fare_quartiles: Vec<CategoryRate>,
}

impl Breakdown {
    fn compute(table: &PassengerTable, column: Column) -> Self {
        Self {
            column,
            rates: rate_by_category(table, column),
            family_size: family_size_rate(table),
            age_groups: age_group_rate(table),
            fare_quartiles: fare_quartile_rate(table),
        }
    }
}

pub struct App<'a> {
    table: &'a PassengerTable,
    pub loaded_at: DateTime<Local>,
    pub tab: Tab,
    pub report: Report,
    pub drill_down: DrillDown,
    pub explorer: Result<PassengerTable>,
    pub breakdown: Breakdown,
    pub should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(table: &'a PassengerTable) -> Result<Self> {
        let drill_down = DrillDown::default();
        Ok(Self {
            table,
            loaded_at: Local::now(),
            tab: Tab::Overview,
            report: Report::build(table)?,
            explorer: filter_by_selection(table, &drill_down.selection()),
            drill_down,
            breakdown: Breakdown::compute(table, Column::ALL[0]),
            should_quit: false,
        })
    }

    pub fn table(&self) -> &PassengerTable {
        self.table
    }

    pub fn on_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::Char('1') => self.tab = Tab::Overview,
            KeyCode::Char('2') => self.tab = Tab::Explorer,
            KeyCode::Char('3') => self.tab = Tab::Breakdown,
            KeyCode::Char('4') => self.tab = Tab::About,
            KeyCode::Char('c') => {
                let classes = [PassengerClass::First, PassengerClass::Second, PassengerClass::Third];
                self.drill_down.class = cycle(self.drill_down.class, &classes);
                self.refresh_explorer();
            }
            KeyCode::Char('g') => {
                self.drill_down.gender = cycle(self.drill_down.gender, &[Gender::Female, Gender::Male]);
                self.refresh_explorer();
            }
            KeyCode::Char('s') => {
                self.drill_down.survived = cycle(self.drill_down.survived, &[true, false]);
                self.refresh_explorer();
            }
            KeyCode::Char('a') => {
                let windows = (0..AGE_WINDOWS.len()).collect::<Vec<_>>();
                self.drill_down.age_window = cycle(self.drill_down.age_window, &windows);
                self.refresh_explorer();
            }
            KeyCode::Char('r') => {
                self.drill_down = DrillDown::default();
                self.refresh_explorer();
            }
            KeyCode::Char('b') => {
                let index = Column::ALL
                    .iter()
                    .position(|c| *c == self.breakdown.column)
                    .map_or(0, |i| (i + 1) % Column::ALL.len());
                self.breakdown = Breakdown::compute(self.table, Column::ALL[index]);
                if let Err(e) = &self.breakdown.rates {
                    debug!(column = %self.breakdown.column, error = %e, "breakdown unavailable");
                }
            }
            _ => {}
        }
    }

    fn refresh_explorer(&mut self) {
        self.explorer = filter_by_selection(self.table, &self.drill_down.selection());
        if let Ok(subset) = &self.explorer {
            debug!(filter = %self.drill_down.describe(), rows = subset.len(), "drill-down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::titanic_like_table;

    #[test]
    fn tabs_switch_by_number_and_tab_key() {
        let table = titanic_like_table();
        let mut app = App::new(&table).unwrap();
        assert_eq!(app.tab, Tab::Overview);
        app.on_key(KeyCode::Char('3'));
        assert_eq!(app.tab, Tab::Breakdown);
        app.on_key(KeyCode::Tab);
        assert_eq!(app.tab, Tab::About);
        app.on_key(KeyCode::Tab);
        assert_eq!(app.tab, Tab::Overview);
        assert!(!app.should_quit);
        app.on_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn drill_down_keys_narrow_the_explorer() {
        let table = titanic_like_table();
        let mut app = App::new(&table).unwrap();
        assert_eq!(app.explorer.as_ref().unwrap().len(), 891);

        app.on_key(KeyCode::Char('g'));
        assert_eq!(app.drill_down.gender, Some(Gender::Female));
        app.on_key(KeyCode::Char('c'));
        assert_eq!(app.drill_down.class, Some(PassengerClass::First));
        assert_eq!(app.explorer.as_ref().unwrap().len(), 94);

        app.on_key(KeyCode::Char('s'));
        assert_eq!(app.explorer.as_ref().unwrap().len(), 91);

        app.on_key(KeyCode::Char('r'));
        assert_eq!(app.drill_down, DrillDown::default());
        assert_eq!(app.explorer.as_ref().unwrap().len(), 891);
    }

    #[test]
    fn filters_cycle_back_to_any() {
        let mut drill_down = DrillDown::default();
        let classes = [PassengerClass::First, PassengerClass::Second, PassengerClass::Third];
        for expected in classes {
            drill_down.class = cycle(drill_down.class, &classes);
            assert_eq!(drill_down.class, Some(expected));
        }
        drill_down.class = cycle(drill_down.class, &classes);
        assert_eq!(drill_down.class, None);
    }

    #[test]
    fn age_window_becomes_a_range_constraint() {
        let drill_down = DrillDown {
            age_window: Some(4),
            ..DrillDown::default()
        };
        assert_eq!(
            drill_down.selection().constraints(),
            &[Constraint::range(Column::Age, Some(51.0), None)]
        );
        assert!(drill_down.describe().ends_with("age: 51+"));
    }

    #[test]
    fn breakdown_reports_unsupported_columns() {
        let table = titanic_like_table();
        let mut app = App::new(&table).unwrap();
        assert_eq!(app.breakdown.column, Column::Gender);
        assert!(app.breakdown.rates.is_ok());

        // gender -> class -> embarked -> survived
        for _ in 0..3 {
            app.on_key(KeyCode::Char('b'));
        }
        assert_eq!(app.breakdown.column, Column::Survived);
        assert!(matches!(
            &app.breakdown.rates,
            Err(Error::InvalidColumn(name)) if name == "survived"
        ));
        assert_eq!(app.breakdown.family_size.len(), 3);
    }
}
