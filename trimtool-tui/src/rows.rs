//! Table field access for backend records.

use trimtool_lib::model::{Alias, Candidate, Listing, Trim};

use crate::table::{CellValue, TableRow};

impl TableRow for Listing {
    fn field(&self, key: &str) -> CellValue {
        match key {
            "ad_id" => self.ad_id.as_str().into(),
            "brand" => self.brand.as_str().into(),
            "model" => self.model.as_str().into(),
            "year" => self.year.as_ref().into(),
            "trim" => self.trim.as_ref().into(),
            "normalized_trim" => self.normalized_trim.as_ref().into(),
            "confidence" => self.confidence.into(),
            "method" => self.method.as_ref().into(),
            "needs_review" => self.needs_review.into(),
            "processed_at" => self.processed_at.as_ref().into(),
            _ => CellValue::Null,
        }
    }
}

impl TableRow for Trim {
    fn field(&self, key: &str) -> CellValue {
        match key {
            "id" => self.id.into(),
            "make" => self.make.as_str().into(),
            "model" => self.model.as_str().into(),
            "trim_name" => self.trim_name.as_str().into(),
            "year_start" => self.year_start.into(),
            "year_end" => self.year_end.into(),
            _ => CellValue::Null,
        }
    }
}

impl TableRow for Alias {
    fn field(&self, key: &str) -> CellValue {
        match key {
            "id" => self.id.into(),
            "alias" => self.alias.as_str().into(),
            "trim_master_id" => self.trim_master_id.into(),
            "master" => self.master_label().into(),
            "make" => self.make.as_ref().into(),
            "model" => self.model.as_ref().into(),
            "trim_name" => self.trim_name.as_ref().into(),
            "created_at" => self.created_at.as_ref().into(),
            _ => CellValue::Null,
        }
    }
}

impl TableRow for Candidate {
    fn field(&self, key: &str) -> CellValue {
        match key {
            "trim" => self.trim.as_str().into(),
            "score" => self.score.into(),
            _ => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{RowKey, row_key};

    fn listing(ad_id: &str, confidence: Option<f64>) -> Listing {
        Listing {
            ad_id: ad_id.into(),
            brand: "Kia".into(),
            model: "Rio".into(),
            year: Some("2019".into()),
            trim: Some("lx plus".into()),
            normalized_trim: None,
            confidence,
            method: None,
            needs_review: true,
            processed_at: None,
        }
    }

    #[test]
    fn test_listing_is_keyed_by_ad_id() {
        let row = listing("AD-77", None);
        assert_eq!(row_key(&row, 3), RowKey::AdId("AD-77".into()));
        assert_eq!(row.field("confidence"), CellValue::Null);
        assert_eq!(row.field("needs_review"), CellValue::Bool(true));
        assert_eq!(row.field("unknown"), CellValue::Null);
    }

    #[test]
    fn test_blank_ad_id_falls_back_to_index() {
        assert_eq!(row_key(&listing("", Some(0.5)), 4), RowKey::Index(4));
    }

    #[test]
    fn test_trim_and_alias_are_keyed_by_id() {
        let trim = Trim {
            id: 12,
            make: "Toyota".into(),
            model: "Camry".into(),
            trim_name: "SE".into(),
            year_start: Some(2018),
            year_end: None,
        };
        assert_eq!(row_key(&trim, 0), RowKey::Id("12".into()));
        assert_eq!(trim.field("year_end"), CellValue::Null);

        let alias = Alias {
            id: 3,
            trim_master_id: 12,
            alias: "se sport".into(),
            make: Some("Toyota".into()),
            model: Some("Camry".into()),
            trim_name: Some("SE".into()),
            created_at: None,
        };
        assert_eq!(row_key(&alias, 0), RowKey::Id("3".into()));
        assert_eq!(alias.field("master"), CellValue::Text("Toyota Camry - SE".into()));
    }
}
