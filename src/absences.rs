//! Employee absences (leave requests) and their approval workflow.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Body, NO_QUERY},
    common::{ListParams, Page, Paged, ReasonBody},
    core::{ensure_date_order, ensure_id},
    errors::{Result, ValidationError},
    model::{validate_required, validate_update, Model},
};

const ABSENCES: &str = "/absences";

string_enum! {
    pub enum AbsenceState {
        Pending => "pending",
        Approved => "approved",
        Refused => "refused",
        Cancelled => "cancelled",
    }
}

string_enum! {
    /// Half-day boundary of an absence.
    pub enum DayPeriod {
        Morning => "morning",
        Afternoon => "afternoon",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Absence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub user_id: u64,
    pub absence_type_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_period: Option<DayPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_period: Option<DayPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<AbsenceState>,
    /// Working days counted by the server, in half-day steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl_model!(
    Absence,
    "absence",
    ["user_id", "absence_type_id", "start_date", "end_date"]
);

impl Absence {
    pub fn is_pending(&self) -> bool {
        self.state == Some(AbsenceState::Pending)
    }

    /// Whether `date` falls inside the absence, bounds included.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceCreateRequest {
    pub user_id: u64,
    pub absence_type_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_period: Option<DayPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_period: Option<DayPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl AbsenceCreateRequest {
    pub fn new(
        user_id: u64,
        absence_type_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            user_id,
            absence_type_id,
            start_date,
            end_date,
            start_period: None,
            end_period: None,
            comment: None,
        }
    }

    /// Starts at noon on `start_date`.
    pub fn starting_afternoon(mut self) -> Self {
        self.start_period = Some(DayPeriod::Afternoon);
        self
    }

    /// Ends at noon on `end_date`.
    pub fn ending_morning(mut self) -> Self {
        self.end_period = Some(DayPeriod::Morning);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl Model for AbsenceCreateRequest {
    const NAME: &'static str = "absence";

    fn required_fields() -> &'static [&'static str] {
        &["user_id", "absence_type_id", "start_date", "end_date"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        ensure_id(self.user_id, "user_id")?;
        ensure_id(self.absence_type_id, "absence_type_id")?;
        ensure_date_order(
            Some(self.start_date),
            Some(self.end_date),
            "end_date",
            "start_date",
        )?;
        check_single_day_periods(
            self.start_date,
            self.end_date,
            self.start_period,
            self.end_period,
        )
    }
}

/// A one-day absence cannot start in the afternoon and end in the morning.
fn check_single_day_periods(
    start: NaiveDate,
    end: NaiveDate,
    start_period: Option<DayPeriod>,
    end_period: Option<DayPeriod>,
) -> Result<()> {
    if start == end
        && start_period == Some(DayPeriod::Afternoon)
        && end_period == Some(DayPeriod::Morning)
    {
        return Err(ValidationError::new("end_period must not be before start_period")
            .with_field("end_period")
            .into());
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsenceUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absence_type_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_period: Option<DayPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_period: Option<DayPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl AbsenceUpdateRequest {
    pub fn dates(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self.end_date = Some(end_date);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl Model for AbsenceUpdateRequest {
    const NAME: &'static str = "absence update";

    fn validate(&self) -> Result<()> {
        validate_update(self)?;
        if let Some(absence_type_id) = self.absence_type_id {
            ensure_id(absence_type_id, "absence_type_id")?;
        }
        ensure_date_order(self.start_date, self.end_date, "end_date", "start_date")?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            check_single_day_periods(start, end, self.start_period, self.end_period)?;
        }
        Ok(())
    }
}

/// Filters for [`AbsencesClient::list`]. `from`/`to` select absences
/// overlapping that range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AbsenceListParams {
    #[serde(flatten)]
    pub params: ListParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absence_type_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AbsenceState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl AbsenceListParams {
    pub fn user(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn absence_type(mut self, absence_type_id: u64) -> Self {
        self.absence_type_id = Some(absence_type_id);
        self
    }

    pub fn state(mut self, state: AbsenceState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }
}

impl Paged for AbsenceListParams {
    fn list_params(&self) -> &ListParams {
        &self.params
    }

    fn list_params_mut(&mut self) -> &mut ListParams {
        &mut self.params
    }

    fn validate_filters(&self) -> Result<()> {
        self.params.validate()?;
        ensure_date_order(self.from, self.to, "to", "from")
    }
}

resource_client! {
    /// Absences endpoints.
    AbsencesClient
}

impl AbsencesClient {
    pub async fn list(&self, params: AbsenceListParams) -> Result<Page<Absence>> {
        params.validate_filters()?;
        self.inner
            .execute_page(ABSENCES, Some(&params), &self.options)
            .await
    }

    pub async fn list_all(&self, params: AbsenceListParams) -> Result<Vec<Absence>> {
        self.inner
            .collect_pages(ABSENCES, params, &self.options)
            .await
    }

    pub async fn get(&self, absence_id: u64) -> Result<Absence> {
        ensure_id(absence_id, "absence_id")?;
        self.inner
            .execute_model(
                Method::GET,
                &format!("{ABSENCES}/{absence_id}"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn create(&self, req: AbsenceCreateRequest) -> Result<Absence> {
        req.validate()?;
        self.inner
            .execute_model(Method::POST, ABSENCES, NO_QUERY, Body::json(&req)?, &self.options)
            .await
    }

    pub async fn update(&self, absence_id: u64, req: AbsenceUpdateRequest) -> Result<Absence> {
        ensure_id(absence_id, "absence_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::PATCH,
                &format!("{ABSENCES}/{absence_id}"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn delete(&self, absence_id: u64) -> Result<()> {
        ensure_id(absence_id, "absence_id")?;
        self.inner
            .execute_empty(
                Method::DELETE,
                &format!("{ABSENCES}/{absence_id}"),
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn approve(&self, absence_id: u64) -> Result<Absence> {
        ensure_id(absence_id, "absence_id")?;
        self.inner
            .execute_model(
                Method::POST,
                &format!("{ABSENCES}/{absence_id}/approve"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn refuse(&self, absence_id: u64, reason: Option<&str>) -> Result<Absence> {
        ensure_id(absence_id, "absence_id")?;
        self.inner
            .execute_model(
                Method::POST,
                &format!("{ABSENCES}/{absence_id}/refuse"),
                NO_QUERY,
                Body::json(&ReasonBody::new(reason))?,
                &self.options,
            )
            .await
    }
}
