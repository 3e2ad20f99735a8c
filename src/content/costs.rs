//! Registration fee breakdown and accommodation line

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ContentGenerator, LINE_CELL_STYLE, TOTAL_CELL_STYLE};
use crate::template::{escape_html, field_label, Formatter, Fragment};

/// Players registered for one sport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SportLine {
    /// Sport code, e.g. `basketball_men`
    pub sport: String,
    pub players: u32,
}

/// One displayed row of the fee breakdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostLine {
    pub label: String,
    pub quantity: u32,
    pub amount: u64,
}

/// Fee lines plus their total.
///
/// The total is the sum of the line amounts as displayed, never recomputed
/// from the inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostBreakdown {
    lines: Vec<CostLine>,
    total: u64,
}

impl CostBreakdown {
    /// Price each sport line at `per_player_fee`
    pub fn compute(
        sports: &[SportLine],
        per_player_fee: u64,
        catalog: &HashMap<String, String>,
    ) -> Self {
        let lines: Vec<CostLine> = sports
            .iter()
            .map(|line| CostLine {
                label: catalog
                    .get(&line.sport)
                    .cloned()
                    .unwrap_or_else(|| field_label(&line.sport)),
                quantity: line.players,
                amount: u64::from(line.players) * per_player_fee,
            })
            .collect();
        let total = lines.iter().map(|line| line.amount).sum();

        Self { lines, total }
    }

    pub fn lines(&self) -> &[CostLine] {
        &self.lines
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Three-column rows (sport, players, amount) and a total row
    pub fn render(&self, formatter: &Formatter) -> Fragment {
        if self.lines.is_empty() {
            return Fragment::empty();
        }

        let mut html = String::new();
        for line in &self.lines {
            let plural = if line.quantity == 1 { "" } else { "s" };
            html.push_str(&format!(
                r#"<tr><td style="{style}">{}</td><td style="{style}">{} Player{}</td><td style="{style}">{}</td></tr>"#,
                escape_html(&line.label),
                line.quantity,
                plural,
                formatter.currency(line.amount as f64),
                style = LINE_CELL_STYLE,
            ));
        }
        html.push_str(&format!(
            r#"<tr class="total-row"><td colspan="2" style="text-align: right; {style}">Total Registration Fee:</td><td style="{style}">{}</td></tr>"#,
            formatter.currency(self.total as f64),
            style = TOTAL_CELL_STYLE,
        ));

        Fragment::new(html)
    }
}

/// Generator wrapper binding the fee and sport catalog
#[derive(Debug, Clone)]
pub struct CostTable {
    per_player_fee: u64,
    catalog: HashMap<String, String>,
    formatter: Formatter,
}

impl CostTable {
    pub fn new(per_player_fee: u64, catalog: HashMap<String, String>, formatter: Formatter) -> Self {
        Self {
            per_player_fee,
            catalog,
            formatter,
        }
    }

    pub fn breakdown(&self, sports: &[SportLine]) -> CostBreakdown {
        CostBreakdown::compute(sports, self.per_player_fee, &self.catalog)
    }
}

impl ContentGenerator for CostTable {
    type Record = SportLine;

    fn generate(&self, records: &[SportLine]) -> Fragment {
        self.breakdown(records).render(&self.formatter)
    }
}

/// Accommodation booked alongside a payment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Accommodation {
    #[serde(default, rename = "accommodationPeople")]
    pub people: Option<u32>,
    #[serde(default, rename = "accommodationPrice")]
    pub price_per_person: Option<f64>,
}

impl Accommodation {
    /// Both people and price present and non-zero
    pub fn is_booked(&self) -> bool {
        matches!(
            (self.people, self.price_per_person),
            (Some(people), Some(price)) if people > 0 && price > 0.0
        )
    }
}

/// One row per booked accommodation: people, price per person, line total
#[derive(Debug, Clone)]
pub struct AccommodationTable {
    formatter: Formatter,
}

impl AccommodationTable {
    pub fn new(formatter: Formatter) -> Self {
        Self { formatter }
    }
}

impl ContentGenerator for AccommodationTable {
    type Record = Accommodation;

    fn generate(&self, records: &[Accommodation]) -> Fragment {
        let mut html = String::new();

        for record in records {
            let (Some(people), Some(price)) = (record.people, record.price_per_person) else {
                continue;
            };
            if !record.is_booked() {
                continue;
            }
            html.push_str(&format!(
                r#"<tr><td style="{style}">{}</td><td style="{style}">{}</td><td style="{style}">{}</td></tr>"#,
                people,
                self.formatter.currency(price),
                self.formatter.currency(f64::from(people) * price),
                style = LINE_CELL_STYLE,
            ));
        }

        Fragment::new(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sport: &str, players: u32) -> SportLine {
        SportLine {
            sport: sport.to_string(),
            players,
        }
    }

    fn catalog() -> HashMap<String, String> {
        HashMap::from([("basketball_men".to_string(), "Basketball (Men)".to_string())])
    }

    #[test]
    fn test_total_matches_sum_of_lines() {
        let breakdown = CostBreakdown::compute(&[line("basketball_men", 3)], 800, &catalog());
        assert_eq!(breakdown.lines()[0].amount, 2400);
        assert_eq!(breakdown.total(), 3 * 800);

        let breakdown = CostBreakdown::compute(
            &[line("basketball_men", 5), line("chess", 1), line("tennis_women", 2)],
            800,
            &catalog(),
        );
        let displayed: u64 = breakdown.lines().iter().map(|l| l.amount).sum();
        assert_eq!(breakdown.total(), displayed);
        assert_eq!(breakdown.total(), 6400);
    }

    #[test]
    fn test_labels_use_catalog_then_field_label() {
        let breakdown =
            CostBreakdown::compute(&[line("basketball_men", 1), line("tableTennis", 2)], 800, &catalog());
        assert_eq!(breakdown.lines()[0].label, "Basketball (Men)");
        assert_eq!(breakdown.lines()[1].label, "Table Tennis");
    }

    #[test]
    fn test_render_rows_and_total() {
        let table = CostTable::new(800, catalog(), Formatter::default());
        let html = table
            .generate(&[line("basketball_men", 1), line("chess", 125)])
            .into_string();

        assert!(html.contains(">1 Player</td>"));
        assert!(html.contains(">125 Players</td>"));
        assert!(html.contains(">₹800</td>"));
        assert!(html.contains(">₹1,00,000</td>"));
        assert!(html.contains("Total Registration Fee:"));
        assert!(html.contains(">₹1,00,800</td>"));
    }

    #[test]
    fn test_empty_sports_yield_empty_fragment() {
        let table = CostTable::new(800, catalog(), Formatter::default());
        assert!(table.generate(&[]).is_empty());
    }

    #[test]
    fn test_accommodation_row() {
        let table = AccommodationTable::new(Formatter::default());
        let html = table
            .generate(&[Accommodation {
                people: Some(4),
                price_per_person: Some(1500.0),
            }])
            .into_string();

        assert!(html.contains(">4</td>"));
        assert!(html.contains(">₹1,500</td>"));
        assert!(html.contains(">₹6,000</td>"));
    }

    #[test]
    fn test_accommodation_requires_people_and_price() {
        let table = AccommodationTable::new(Formatter::default());
        let partial = [
            Accommodation {
                people: Some(4),
                price_per_person: None,
            },
            Accommodation {
                people: Some(0),
                price_per_person: Some(1500.0),
            },
            Accommodation::default(),
        ];
        assert!(table.generate(&partial).is_empty());
        assert!(!partial[0].is_booked());
    }
}
