use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("display target `{0}` is missing from the page")]
    MissingTarget(&'static str),

    #[error(
        "series are not index-aligned: {labels} labels, {sent} sent, {responded} responded"
    )]
    MisalignedSeries {
        labels: usize,
        sent: usize,
        responded: usize,
    },

    #[error("heatmap point out of range: day {day}, hour {hour}")]
    CellOutOfRange { day: i64, hour: i64 },

    #[error("chart creation failed: {0}")]
    Chart(String),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
