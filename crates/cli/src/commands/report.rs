//! Report commands, printed as aligned text tables.
//!
//! ```bash
//! sk-cli report order-totals
//! sk-cli report inactive-customers --as-of 2024-03-31 --days 30
//! sk-cli report best-sellers --limit 5
//! sk-cli report average-ratings
//! ```

use chrono::NaiveDate;

use storekeep_db::ReportRepository;

/// Print every order with its recorded total and line-item sum.
///
/// Orders whose total disagrees with their items are flagged with `*`.
///
/// # Errors
///
/// Returns an error if configuration is missing or the query fails.
pub async fn order_totals() -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;
    let rows = ReportRepository::new(&pool).order_totals().await?;
    pool.close().await;

    let table = render_table(
        &["order", "customer", "date", "items", "items total", "total", ""],
        rows.iter().map(|r| {
            vec![
                r.order_id.to_string(),
                r.customer_name.clone(),
                r.order_date.to_string(),
                r.item_count.to_string(),
                format!("{:.2}", r.items_total),
                r.total_amount.to_string(),
                if r.is_inconsistent() { "*" } else { "" }.to_string(),
            ]
        }),
    );
    print_table(&table);
    Ok(())
}

/// Print customers with no order in the `days` days up to `as_of`.
///
/// # Errors
///
/// Returns an error if configuration is missing or the query fails.
pub async fn inactive_customers(
    as_of: NaiveDate,
    days: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;
    let rows = ReportRepository::new(&pool)
        .inactive_customers(as_of, days)
        .await?;
    pool.close().await;

    let table = render_table(
        &["customer", "name", "email", "last order"],
        rows.iter().map(|r| {
            vec![
                r.customer_id.to_string(),
                r.name.clone(),
                r.email.to_string(),
                r.last_order_date
                    .map_or_else(|| "never".to_string(), |d| d.to_string()),
            ]
        }),
    );
    print_table(&table);
    Ok(())
}

/// Print the top `limit` products by units sold.
///
/// # Errors
///
/// Returns an error if configuration is missing or the query fails.
pub async fn best_sellers(limit: i64) -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;
    let rows = ReportRepository::new(&pool).best_sellers(limit).await?;
    pool.close().await;

    let table = render_table(
        &["rank", "product", "name", "sold"],
        rows.iter().map(|r| {
            vec![
                r.rank.to_string(),
                r.product_id.to_string(),
                r.name.clone(),
                r.total_sold.to_string(),
            ]
        }),
    );
    print_table(&table);
    Ok(())
}

/// Print the average rating of every reviewed product.
///
/// # Errors
///
/// Returns an error if configuration is missing or the query fails.
pub async fn average_ratings() -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;
    let rows = ReportRepository::new(&pool).average_ratings().await?;
    pool.close().await;

    let table = render_table(
        &["product", "name", "average", "reviews"],
        rows.iter().map(|r| {
            vec![
                r.product_id.to_string(),
                r.name.clone(),
                r.average_rating.to_string(),
                r.review_count.to_string(),
            ]
        }),
    );
    print_table(&table);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_table(table: &str) {
    print!("{table}");
}

/// Lay out `rows` under `headers` with columns padded to their widest cell.
///
/// Trailing padding is trimmed from each line.
fn render_table<I>(headers: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let rows: Vec<Vec<String>> = rows.into_iter().collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
    push_line(&mut out, &widths, &header_cells);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &widths, &rule);
    for row in &rows {
        push_line(&mut out, &widths, row);
    }
    if rows.is_empty() {
        out.push_str("(no rows)\n");
    }
    out
}

fn push_line(out: &mut String, widths: &[usize], cells: &[String]) {
    let line = widths
        .iter()
        .zip(cells)
        .map(|(width, cell)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_align_to_widest_cell() {
        let table = render_table(
            &["rank", "name"],
            vec![
                vec!["1".to_string(), "Laptop".to_string()],
                vec!["2".to_string(), "Phone".to_string()],
            ],
        );
        assert_eq!(
            table,
            "rank  name\n----  ------\n1     Laptop\n2     Phone\n"
        );
    }

    #[test]
    fn test_empty_report() {
        let table = render_table(&["product", "average"], Vec::new());
        assert_eq!(table, "product  average\n-------  -------\n(no rows)\n");
    }
}
