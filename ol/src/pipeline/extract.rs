//! Extract phase: CSV file → in-memory table

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info};

use super::PipelineContext;
use crate::domain::SourceOrder;
use crate::error::PipelineError;

/// Read every row of the input CSV.
///
/// Columns are resolved by header name, so column order and extra columns do
/// not matter. A single malformed row fails the whole extract.
pub fn extract(ctx: &PipelineContext) -> Result<Vec<SourceOrder>, PipelineError> {
    let path = &ctx.input_path;
    debug!(?path, "extract: called");

    if !path.exists() {
        debug!("extract: input file does not exist");
        return Err(PipelineError::MissingInput { path: path.clone() });
    }

    let parse_error = |source| PipelineError::Parse {
        path: path.clone(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(parse_error)?;

    let rows = reader
        .deserialize::<SourceOrder>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(parse_error)?;

    info!(count = rows.len(), "Read records from CSV");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "vendor_id,order_date,product_name,quantity,price,delivery_location,payment_method";

    fn context_with_input(temp: &TempDir, content: &str) -> PipelineContext {
        let input = temp.path().join("vendor_orders.csv");
        fs::write(&input, content).unwrap();
        PipelineContext::new(input, temp.path().join("db").join("orders.db"))
    }

    #[test]
    fn test_extract_reads_rows() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_input(
            &temp,
            &format!("{HEADER}\nV001,2024-01-01,Maize,10,50,  nairobi cbd ,  mpesa \nV002,2024-01-02,Rice,3,120.5,Karen,Cash\n"),
        );

        let rows = extract(&ctx).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].delivery_location, "  nairobi cbd ");
        assert_eq!(rows[0].payment_method, "  mpesa ");
        assert_eq!(rows[1].price, 120.5);
    }

    #[test]
    fn test_extract_trims_header_names() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_input(
            &temp,
            " vendor_id , order_date ,product_name,quantity,price,delivery_location,payment_method\nV001,2024-01-01,Maize,1,2,Karen,Cash\n",
        );

        let rows = extract(&ctx).unwrap();
        assert_eq!(rows[0].vendor_id, "V001");
    }

    #[test]
    fn test_extract_missing_file() {
        let temp = TempDir::new().unwrap();
        let ctx = PipelineContext::new(temp.path().join("absent.csv"), temp.path().join("orders.db"));

        let err = extract(&ctx).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { .. }));
    }

    #[test]
    fn test_extract_rejects_missing_column() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_input(
            &temp,
            "vendor_id,order_date,product_name,quantity,price,delivery_location\nV001,2024-01-01,Maize,10,50,Karen\n",
        );

        let err = extract(&ctx).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }

    #[test]
    fn test_extract_rejects_non_numeric_quantity() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_input(
            &temp,
            &format!("{HEADER}\nV001,2024-01-01,Maize,10,50,Karen,Cash\nV002,2024-01-01,Maize,ten,50,Karen,Cash\n"),
        );

        let err = extract(&ctx).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }

    #[test]
    fn test_extract_rejects_ragged_row() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_input(&temp, &format!("{HEADER}\nV001,2024-01-01,Maize,10\n"));

        let err = extract(&ctx).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }

    #[test]
    fn test_extract_header_only() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_input(&temp, &format!("{HEADER}\n"));

        assert!(extract(&ctx).unwrap().is_empty());
    }
}
