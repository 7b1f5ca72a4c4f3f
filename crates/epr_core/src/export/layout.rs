//! Fixed-position text layout for rating exports.
//!
//! # Responsibility
//! - Turn a rating record into the ordered `Label: value` lines.
//! - Assign each line a baseline position on the first template page.
//!
//! # Invariants
//! - Lines are single-line and never wrapped or paginated.
//! - Baselines strictly decrease from one line to the next.

use crate::model::rating::RatingRecord;

/// Geometry of the overlay, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    /// Left x coordinate shared by every line.
    pub left_margin: f32,
    /// Distance from the top edge of the page to the first baseline.
    pub top_offset: f32,
    pub font_size: f32,
    /// Advance after each header line.
    pub header_spacing: f32,
    /// Extra advance between the header block and the free-text block.
    pub section_gap: f32,
    /// Advance after each free-text line.
    pub body_spacing: f32,
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self {
            left_margin: 50.0,
            top_offset: 120.0,
            font_size: 10.0,
            header_spacing: 14.0,
            section_gap: 6.0,
            body_spacing: 12.0,
        }
    }
}

/// Block a line belongs to; determines its spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBlock {
    Header,
    Body,
}

/// One `Label: value` line before placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLine {
    pub block: LineBlock,
    pub text: String,
}

/// A line with its final baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Builds the ordered overlay lines for `record`.
///
/// Empty values render as empty text after the label; no line is omitted.
pub fn compose_lines(record: &RatingRecord) -> Vec<OverlayLine> {
    let header = |label: &str, value: &str| OverlayLine {
        block: LineBlock::Header,
        text: format!("{label}: {value}"),
    };
    let body = |label: &str, value: &str| OverlayLine {
        block: LineBlock::Body,
        text: format!("{label}: {value}"),
    };

    vec![
        header("Employee Name", &record.employee_name),
        header("Employee ID", &record.employee_id),
        header("Position", &record.position),
        header("Department", &record.department),
        header("Reviewer", &record.reviewer),
        header(
            "Rating Period",
            &format!(
                "{} - {}",
                record.review_period_start, record.review_period_end
            ),
        ),
        header("Overall Rating", &record.overall_rating),
        body("Strengths", &record.strengths),
        body("Areas to Improve", &record.improvements),
        body("Goals", &record.goals),
    ]
}

impl OverlayLayout {
    /// Places `lines` top-down starting `top_offset` below `page_height`.
    ///
    /// Each line is drawn at the cursor, then the cursor moves down by the
    /// spacing of the line's block. The first body line gets `section_gap`
    /// of extra space above it.
    pub fn place(&self, page_height: f32, lines: Vec<OverlayLine>) -> Vec<PlacedLine> {
        let mut cursor = page_height - self.top_offset;
        let mut previous_block = None;
        let mut placed = Vec::with_capacity(lines.len());

        for line in lines {
            if previous_block == Some(LineBlock::Header) && line.block == LineBlock::Body {
                cursor -= self.section_gap;
            }

            placed.push(PlacedLine {
                text: line.text,
                x: self.left_margin,
                y: cursor,
            });

            cursor -= match line.block {
                LineBlock::Header => self.header_spacing,
                LineBlock::Body => self.body_spacing,
            };
            previous_block = Some(line.block);
        }

        placed
    }
}

#[cfg(test)]
mod tests {
    use super::{compose_lines, LineBlock, OverlayLayout};
    use crate::model::rating::RatingRecord;

    fn record() -> RatingRecord {
        RatingRecord {
            id: 7,
            employee_name: "Jane Doe".to_string(),
            employee_id: "E100".to_string(),
            position: "Analyst".to_string(),
            department: String::new(),
            reviewer: "Sam Lee".to_string(),
            review_period_start: "2024-01-01".to_string(),
            review_period_end: String::new(),
            overall_rating: "Exceeds Expectations".to_string(),
            strengths: "Thorough".to_string(),
            improvements: String::new(),
            goals: "Lead a project".to_string(),
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn compose_lines_keeps_order_and_empty_segments() {
        let texts: Vec<_> = compose_lines(&record())
            .into_iter()
            .map(|line| line.text)
            .collect();
        assert_eq!(
            texts,
            [
                "Employee Name: Jane Doe",
                "Employee ID: E100",
                "Position: Analyst",
                "Department: ",
                "Reviewer: Sam Lee",
                "Rating Period: 2024-01-01 - ",
                "Overall Rating: Exceeds Expectations",
                "Strengths: Thorough",
                "Areas to Improve: ",
                "Goals: Lead a project",
            ]
        );
    }

    #[test]
    fn compose_lines_splits_header_and_body_blocks() {
        let blocks: Vec<_> = compose_lines(&record())
            .into_iter()
            .map(|line| line.block)
            .collect();
        assert!(blocks[..7].iter().all(|b| *b == LineBlock::Header));
        assert!(blocks[7..].iter().all(|b| *b == LineBlock::Body));
    }

    #[test]
    fn place_uses_header_spacing_gap_and_body_spacing() {
        let layout = OverlayLayout::default();
        let placed = layout.place(792.0, compose_lines(&record()));
        let ys: Vec<f32> = placed.iter().map(|line| line.y).collect();
        assert_eq!(
            ys,
            [672.0, 658.0, 644.0, 630.0, 616.0, 602.0, 588.0, 568.0, 556.0, 544.0]
        );
        assert!(placed.iter().all(|line| line.x == 50.0));
    }

    #[test]
    fn place_moves_strictly_downward() {
        let placed = OverlayLayout::default().place(842.0, compose_lines(&record()));
        assert!(placed.windows(2).all(|pair| pair[1].y < pair[0].y));
    }
}
