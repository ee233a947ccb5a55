use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LogsParams {
    #[serde(default)]
    pub ds: Option<String>,
}

/// `ds` as `YYYY-MM-DD`; today when absent or unparseable.
fn resolve_date(ds: Option<&str>) -> NaiveDate {
    ds.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Local::now().date_naive())
}

/// GET /logs?ds=YYYY-MM-DD: raw info log for one day.
pub async fn get_logs(
    State(app): State<AppState>,
    Query(params): Query<LogsParams>,
) -> Result<impl IntoResponse, AppError> {
    let date = resolve_date(params.ds.as_deref());
    let path = app.info_log.filename(date);

    let body = match tokio::fs::read_to_string(&path).await {
        Ok(body) => body,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::not_found(format!("no log for {date}")));
        }
        Err(e) => return Err(AppError(e.into())),
    };

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_date_parses_iso_day() {
        assert_eq!(
            resolve_date(Some("2024-03-07")),
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
        );
    }

    #[test]
    fn resolve_date_falls_back_to_today() {
        let today = Local::now().date_naive();
        assert_eq!(resolve_date(None), today);
        assert_eq!(resolve_date(Some("03/07/2024")), today);
    }
}
