use crate::db::Search;
use crate::measurement::{Column, Measurement};
use color_eyre::eyre::{self, WrapErr};
use color_eyre::Report;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// In-memory table with all the measurements of a results file.
#[derive(Debug, Clone)]
pub struct MeasurementDB {
    // whether the file has a `Scenario` column
    has_scenario: bool,
    rows: Vec<Measurement>,
}

impl MeasurementDB {
    /// Loads the results file at `path`.
    ///
    /// Headers and values are trimmed. If `skip_repeated_headers` is set,
    /// data rows that repeat the header (as found when results files are
    /// concatenated) are dropped; otherwise they fail numeric conversion.
    pub fn load<P: AsRef<Path>>(
        path: P,
        skip_repeated_headers: bool,
    ) -> Result<Self, Report> {
        let path = path.as_ref();
        let file = File::open(path).wrap_err_with(|| {
            format!("open results file {}", path.display())
        })?;
        let db = Self::from_reader(file, skip_repeated_headers)
            .wrap_err_with(|| {
                format!("parse results file {}", path.display())
            })?;
        info!(
            "loaded {} rows ({} variants) from {}",
            db.len(),
            db.variants().len(),
            path.display()
        );
        Ok(db)
    }

    /// Parses a results table from any reader.
    pub fn from_reader<R: Read>(
        reader: R,
        skip_repeated_headers: bool,
    ) -> Result<Self, Report> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let headers = reader.headers().wrap_err("read header row")?.clone();
        let positions = Positions::from(&headers)?;

        let mut rows = Vec::new();
        let mut repeated_headers = 0;
        for record in reader.records() {
            let record = record.wrap_err("read row")?;
            let line = record
                .position()
                .map(|position| position.line())
                .unwrap_or_default();

            if skip_repeated_headers && positions.is_repeated_header(&record) {
                debug!("line {}: dropping repeated header row", line);
                repeated_headers += 1;
                continue;
            }

            let measurement = positions.parse(&record, line)?;
            rows.push(measurement);
        }

        if repeated_headers > 0 {
            info!("dropped {} repeated header rows", repeated_headers);
        }
        let db = Self {
            has_scenario: positions.scenario.is_some(),
            rows,
        };
        if db.is_empty() {
            warn!("results table has no rows");
        }
        Ok(db)
    }

    pub fn rows(&self) -> &[Measurement] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Checks whether `column` can be referenced in this table.
    pub fn has_column(&self, column: Column) -> bool {
        match column {
            Column::Scenario => self.has_scenario,
            _ => true,
        }
    }

    /// Returns the rows matching `search`, in file order.
    pub fn find(&self, search: &Search) -> Result<Vec<&Measurement>, Report> {
        if search.uses_scenario() && !self.has_scenario {
            eyre::bail!("missing column {:?}", Column::Scenario.header());
        }
        let found = self
            .rows
            .iter()
            .filter(|measurement| search.matches(measurement))
            .collect();
        Ok(found)
    }

    /// Distinct values of a categorical `column`, sorted.
    pub fn distinct(&self, column: Column) -> Result<Vec<String>, Report> {
        if column.is_numeric() {
            eyre::bail!("column {:?} is not categorical", column.header());
        }
        if !self.has_column(column) {
            eyre::bail!("missing column {:?}", column.header());
        }
        let values: BTreeSet<_> = self
            .rows
            .iter()
            .filter_map(|measurement| measurement.label(column))
            .collect();
        Ok(values.into_iter().map(String::from).collect())
    }

    pub fn variants(&self) -> Vec<String> {
        let variants: BTreeSet<_> = self
            .rows
            .iter()
            .map(|measurement| measurement.variant.as_str())
            .collect();
        variants.into_iter().map(String::from).collect()
    }

    pub fn scenarios(&self) -> Result<Vec<String>, Report> {
        self.distinct(Column::Scenario)
    }
}

impl fmt::Display for MeasurementDB {
    // prints the table aligned, with a row index and a size footer
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<_> = Column::STORED
            .iter()
            .copied()
            .filter(|column| self.has_column(*column))
            .collect();

        let cell = |measurement: &Measurement, column: Column| {
            if column.is_categorical() {
                measurement.label(column).unwrap_or_default().to_string()
            } else {
                measurement
                    .value(column)
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            }
        };

        // compute column widths
        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        let widths: Vec<_> = columns
            .iter()
            .map(|column| {
                self.rows
                    .iter()
                    .map(|measurement| cell(measurement, *column).len())
                    .chain(std::iter::once(column.header().len()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        write!(f, "{:>width$}", "", width = index_width)?;
        for (column, width) in columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", column.header(), width = width)?;
        }
        writeln!(f)?;

        for (index, measurement) in self.rows.iter().enumerate() {
            write!(f, "{:>width$}", index, width = index_width)?;
            for (column, width) in columns.iter().zip(&widths) {
                let value = cell(measurement, *column);
                write!(f, "  {:>width$}", value, width = width)?;
            }
            writeln!(f)?;
        }

        write!(f, "[{} rows x {} columns]", self.rows.len(), columns.len())
    }
}

// Position of each column in the results file.
struct Positions {
    scenario: Option<usize>,
    variant: usize,
    cbr: usize,
    throughput: usize,
    avg_rtt: usize,
    drop_rate: usize,
}

impl Positions {
    fn from(headers: &StringRecord) -> Result<Self, Report> {
        let position = |column: Column| {
            headers.iter().position(|header| header == column.header())
        };
        let required = |column: Column| {
            position(column).ok_or_else(|| {
                eyre::eyre!("missing column {:?}", column.header())
            })
        };
        Ok(Self {
            scenario: position(Column::Scenario),
            variant: required(Column::Variant)?,
            cbr: required(Column::Cbr)?,
            throughput: required(Column::Throughput)?,
            avg_rtt: required(Column::AvgRtt)?,
            drop_rate: required(Column::DropRate)?,
        })
    }

    fn numeric(&self) -> [(Column, usize); 4] {
        [
            (Column::Cbr, self.cbr),
            (Column::Throughput, self.throughput),
            (Column::AvgRtt, self.avg_rtt),
            (Column::DropRate, self.drop_rate),
        ]
    }

    // A row is a repeated header if any numeric value is the header text of
    // its column.
    fn is_repeated_header(&self, record: &StringRecord) -> bool {
        self.numeric()
            .iter()
            .any(|(column, index)| record.get(*index) == Some(column.header()))
    }

    fn parse(
        &self,
        record: &StringRecord,
        line: u64,
    ) -> Result<Measurement, Report> {
        let field = |column: Column, index: usize| {
            record.get(index).ok_or_else(|| {
                eyre::eyre!("line {}: missing value for {:?}", line, column.header())
            })
        };
        let number = |column: Column, index: usize| -> Result<f64, Report> {
            let value = field(column, index)?;
            value.parse::<f64>().wrap_err_with(|| {
                format!(
                    "line {}: column {:?} has non-numeric value {:?}",
                    line,
                    column.header(),
                    value
                )
            })
        };

        let scenario = match self.scenario {
            Some(index) => Some(field(Column::Scenario, index)?.to_string()),
            None => None,
        };
        let variant = field(Column::Variant, self.variant)?.to_string();
        Ok(Measurement {
            scenario,
            variant,
            cbr: number(Column::Cbr, self.cbr)?,
            throughput: number(Column::Throughput, self.throughput)?,
            avg_rtt: number(Column::AvgRtt, self.avg_rtt)?,
            drop_rate: number(Column::DropRate, self.drop_rate)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIM_RESULTS: &str = "\
Scenario,Variant,CBR(Mbps),Throughput(Mbps),AvgRTT(ms),DropRate
Scenario1,TcpVegas, 1, 8.1, 41.5, 0.001
Scenario1,TcpVegas, 2, 7.2, 44.5, 0.002
Scenario1,TcpCubic, 1, 8.5, 52.0, 0.01
Scenario2,TcpVegas, 1, 4.1, 61.0, 0.02
Scenario2,TcpCubic, 1, 4.4, 70.5, 0.03
";

    fn load(contents: &str) -> Result<MeasurementDB, Report> {
        MeasurementDB::from_reader(contents.as_bytes(), true)
    }

    #[test]
    fn load_trimmed() {
        let db = load(SIM_RESULTS).unwrap();
        assert_eq!(db.len(), 5);
        let first = &db.rows()[0];
        assert_eq!(first.scenario.as_deref(), Some("Scenario1"));
        assert_eq!(first.variant, "TcpVegas");
        assert_eq!(first.cbr, 1.0);
        assert_eq!(first.throughput, 8.1);
        assert_eq!(first.avg_rtt, 41.5);
        assert_eq!(first.drop_rate, 0.001);
        assert_eq!(db.variants(), vec!["TcpCubic", "TcpVegas"]);
        assert_eq!(db.scenarios().unwrap(), vec!["Scenario1", "Scenario2"]);
    }

    #[test]
    fn padded_headers_and_labels() {
        let contents = "\
 Variant , CBR(Mbps) ,Throughput(Mbps), AvgRTT(ms),DropRate
 NewReno , 1, 5.0, 40.0, 0.1
NewReno , 2, 6.0, 42.0, 0.2
NewReno, 3, 7.0, 44.0, 0.3
";
        let db = load(contents).unwrap();
        assert_eq!(db.len(), 3);
        assert_eq!(db.variants(), vec!["NewReno"]);
        assert!(!db.has_column(Column::Scenario));
        let found = db.find(Search::new().variant("NewReno")).unwrap();
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn repeated_headers_are_dropped() {
        let contents = "\
Scenario,Variant,CBR(Mbps),Throughput(Mbps),AvgRTT(ms),DropRate
Scenario1,TcpBbr,1,9.0,30.0,0.0
Scenario,Variant,CBR(Mbps),Throughput(Mbps),AvgRTT(ms),DropRate
Scenario1,TcpBbr,2,8.0,31.0,0.1
";
        let db = load(contents).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.rows()[1].cbr, 2.0);

        // without the check, the repeated header fails conversion
        let err = MeasurementDB::from_reader(contents.as_bytes(), false)
            .unwrap_err();
        assert!(format!("{:?}", err).contains("non-numeric value"));
    }

    #[test]
    fn header_only() {
        let contents = "\
Scenario,Variant,CBR(Mbps),Throughput(Mbps),AvgRTT(ms),DropRate
Scenario,Variant,CBR(Mbps),Throughput(Mbps),AvgRTT(ms),DropRate
";
        let db = load(contents).unwrap();
        assert!(db.is_empty());
        assert!(db.has_column(Column::Scenario));
        assert!(db.find(&Search::new()).unwrap().is_empty());
    }

    #[test]
    fn missing_column() {
        let contents = "\
Variant,CBR(Mbps),Throughput(Mbps),DropRate
TcpBbr,1,9.0,0.0
";
        let err = load(contents).unwrap_err();
        assert!(err.to_string().contains("AvgRTT(ms)"));
    }

    #[test]
    fn non_numeric_value() {
        let contents = "\
Variant,CBR(Mbps),Throughput(Mbps),AvgRTT(ms),DropRate
TcpBbr,1,9.0,30.0,0.0
TcpBbr,2,fast,30.0,0.0
";
        let err = load(contents).unwrap_err();
        let err = err.to_string();
        assert!(err.contains("line 3"));
        assert!(err.contains("Throughput(Mbps)"));
        assert!(err.contains("\"fast\""));
    }

    #[test]
    fn missing_file() {
        let err = MeasurementDB::load("does/not/exist.csv", true).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.csv"));
    }

    #[test]
    fn find_by_scenario() {
        let db = load(SIM_RESULTS).unwrap();
        let found = db.find(Search::new().scenario("Scenario1")).unwrap();
        assert_eq!(found.len(), 3);
        assert!(found
            .iter()
            .all(|m| m.scenario.as_deref() == Some("Scenario1")));

        let found = db.find(Search::new().scenario("Scenario7")).unwrap();
        assert!(found.is_empty());

        let found = db.find(Search::new().scenario("all")).unwrap();
        assert_eq!(found.len(), db.len());
    }

    #[test]
    fn find_by_scenario_without_column() {
        let contents = "\
Variant,CBR(Mbps),Throughput(Mbps),AvgRTT(ms),DropRate
TcpBbr,1,9.0,30.0,0.0
";
        let db = load(contents).unwrap();
        let err = db.find(Search::new().scenario("Scenario1")).unwrap_err();
        assert!(err.to_string().contains("Scenario"));
        assert!(db.scenarios().is_err());
    }

    #[test]
    fn display() {
        let contents = "\
Variant,CBR(Mbps),Throughput(Mbps),AvgRTT(ms),DropRate
TcpBbr,1,9.5,30,0
";
        let db = load(contents).unwrap();
        let table = db.to_string();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0].split_whitespace().collect::<Vec<_>>(),
            vec![
                "Variant",
                "CBR(Mbps)",
                "Throughput(Mbps)",
                "AvgRTT(ms)",
                "DropRate"
            ]
        );
        assert_eq!(
            lines[1].split_whitespace().collect::<Vec<_>>(),
            vec!["0", "TcpBbr", "1", "9.5", "30", "0"]
        );
        // columns are right-aligned
        assert_eq!(lines[0].len(), lines[1].len());
        assert_eq!(lines[2], "[1 rows x 5 columns]");
    }
}
