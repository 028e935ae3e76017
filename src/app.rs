use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::{self, ADMIN_COOKIE, SESSION_COOKIE};
use crate::config::AppConfig;
use crate::deadline::{format_time_remaining, DeadlineConfig};
use crate::error::AppError;
use crate::model::{Attendance, DraftGuest, ResponseRow, RsvpDraft};
use crate::report;
use crate::session::FormSessionState;
use crate::submit::{process_submission, DeadlineNotice, SubmissionOutcome};
use crate::AppState;

const DISPLAY_FORMAT: &str = "%B %d, %Y at %I:%M %p";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(event_info_page))
        .route("/rsvp", get(rsvp_form_page).post(rsvp_action))
        .route("/admin/login", get(admin_login_page).post(admin_login_action))
        .route("/admin/logout", post(admin_logout_action))
        .route("/admin", get(admin_summary_page))
        .route("/admin/menu", get(admin_menu_page))
        .route("/admin/data", get(admin_data_page))
        .route("/admin/export.csv", get(admin_export))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Public pages

async fn event_info_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_event_page(&state.config))
}

async fn rsvp_form_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session, new_cookie) = ensure_session(&headers);
    state.sessions.initialize(session);
    let now = Local::now().naive_local();
    let policy = state.config.deadline_policy();

    let page = state.sessions.with_session(session, |form| {
        render_rsvp_page(&state.config, policy.as_ref(), form, now, &[])
    });
    html_with_cookie(page, new_cookie)
}

async fn rsvp_action(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let (session, new_cookie) = ensure_session(&headers);
    state.sessions.initialize(session);
    let now = Local::now().naive_local();
    let policy = state.config.deadline_policy();

    let fields = field_map(fields);
    let action = fields
        .get("action")
        .map(String::as_str)
        .unwrap_or("submit")
        .to_string();

    let page = state.sessions.with_session(session, |form| {
        let mut banners = Vec::new();

        if action != "reset" {
            let guest_count = form.draft.guests.len();
            form.update_draft(draft_from_fields(&fields, guest_count));
        }

        match action.as_str() {
            "add_guest" => form.add_guest(),
            "reset" => form.reset(),
            "submit" => {
                if let Some(frozen) = form.begin_submission() {
                    let outcome = process_submission(
                        &frozen,
                        &state.config.menu,
                        policy.as_ref(),
                        now,
                        &state.store,
                    );
                    match outcome {
                        SubmissionOutcome::Accepted { rows_written, notice } => {
                            info!(rows = rows_written, "rsvp stored");
                            banners.extend(notice_banners(notice));
                            form.complete_submission();
                        }
                        SubmissionOutcome::DeadlineClosed => {
                            form.abort_submission(false);
                        }
                        SubmissionOutcome::Invalid(errors) => {
                            banners.push(Banner::ErrorList {
                                heading: "Please fix the following errors:".to_string(),
                                items: errors,
                            });
                            form.abort_submission(false);
                        }
                        SubmissionOutcome::StoreFailed(err) => {
                            error!(error = %err, "rsvp write failed");
                            banners.push(Banner::Error(
                                "An error occurred while saving your RSVP. Please try again."
                                    .to_string(),
                            ));
                            form.abort_submission(true);
                        }
                    }
                }
            }
            other => {
                if let Some(index) = other
                    .strip_prefix("remove_")
                    .and_then(|raw| raw.parse::<usize>().ok())
                {
                    form.remove_guest(index);
                }
            }
        }

        render_rsvp_page(&state.config, policy.as_ref(), form, now, &banners)
    });
    html_with_cookie(page, new_cookie)
}

// ---------------------------------------------------------------------------
// Admin pages

#[derive(Deserialize)]
struct LoginForm {
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct DataQuery {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
struct ExportQuery {
    scope: Option<String>,
}

async fn admin_login_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_login_page(&state.config, None))
}

async fn admin_login_action(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let now = Local::now().naive_local();
    match state.auth.login(&form.password, now) {
        Some(token) => {
            info!("admin login accepted");
            (
                [(header::SET_COOKIE, auth::admin_cookie(&token))],
                Redirect::to("/admin"),
            )
                .into_response()
        }
        None => {
            warn!("admin login rejected");
            Html(render_login_page(
                &state.config,
                Some("Incorrect password. Please try again."),
            ))
            .into_response()
        }
    }
}

async fn admin_logout_action(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = admin_token(&headers) {
        state.auth.logout(token);
    }
    (
        [(header::SET_COOKIE, auth::clear_admin_cookie())],
        Redirect::to("/admin/login"),
    )
        .into_response()
}

async fn admin_summary_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(redirect) = require_admin(&state, &headers) {
        return redirect.into_response();
    }
    let rows = state.store.load_all();
    Html(render_summary_page(&state.config, &rows)).into_response()
}

async fn admin_menu_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(redirect) = require_admin(&state, &headers) {
        return redirect.into_response();
    }
    let rows = state.store.load_all();
    Html(render_menu_page(&state.config, &rows)).into_response()
}

async fn admin_data_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<DataQuery>,
) -> Response {
    if let Err(redirect) = require_admin(&state, &headers) {
        return redirect.into_response();
    }
    let rows = state.store.load_all();
    Html(render_data_page(&state.config, &rows, &query.q)).into_response()
}

async fn admin_export(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    if let Err(redirect) = require_admin(&state, &headers) {
        return Ok(redirect.into_response());
    }
    let rows = state.store.load_all();
    let (scope, rows) = match query.scope.as_deref() {
        Some("attending") => ("attending", report::attending_only(&rows)),
        _ => ("all", rows),
    };
    let body = report::export_csv(&rows)?;
    let filename = report::export_filename(scope, Local::now().date_naive());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Request plumbing

/// Reads the visitor session id from the cookie header, or mints a fresh
/// one together with the Set-Cookie line the response must carry.
fn ensure_session(headers: &HeaderMap) -> (Uuid, Option<String>) {
    let existing = cookie_header(headers)
        .and_then(|header| auth::cookie_value(header, SESSION_COOKIE))
        .and_then(|value| Uuid::parse_str(value).ok());
    match existing {
        Some(id) => (id, None),
        None => {
            let id = Uuid::new_v4();
            (id, Some(auth::session_cookie(id)))
        }
    }
}

fn cookie_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::COOKIE)?.to_str().ok()
}

fn admin_token<'a>(headers: &'a HeaderMap) -> Option<&'a str> {
    cookie_header(headers).and_then(|header| auth::cookie_value(header, ADMIN_COOKIE))
}

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), Redirect> {
    let now = Local::now().naive_local();
    match admin_token(headers) {
        Some(token) if state.auth.validate(token, now) => Ok(()),
        _ => Err(Redirect::to("/admin/login")),
    }
}

fn html_with_cookie(page: String, cookie: Option<String>) -> Response {
    match cookie {
        Some(cookie) => ([(header::SET_COOKIE, cookie)], Html(page)).into_response(),
        None => Html(page).into_response(),
    }
}

/// Collapses the posted key/value pairs into a map. Later values win, which
/// matches how browsers serialise a form with repeated names.
fn field_map(fields: Vec<(String, String)>) -> HashMap<String, String> {
    fields.into_iter().collect()
}

/// Rebuilds the draft from posted fields. The session's guest count is the
/// source of truth: indices beyond it are ignored, missing ones come back
/// empty.
fn draft_from_fields(fields: &HashMap<String, String>, guest_count: usize) -> RsvpDraft {
    let get = |key: &str| fields.get(key).cloned().unwrap_or_default();
    let guests = (0..guest_count)
        .map(|i| DraftGuest {
            name: get(&format!("guest_name_{i}")),
            starter: get(&format!("starter_{i}")),
            main: get(&format!("main_{i}")),
            dessert: get(&format!("dessert_{i}")),
            dietary: get(&format!("dietary_{i}")),
        })
        .collect();

    RsvpDraft {
        attending: Attendance::from_form_value(&get("attending")),
        contact_name: get("contact_name"),
        contact_email: get("contact_email"),
        contact_phone: get("contact_phone"),
        guests,
        comments: get("comments"),
    }
}

// ---------------------------------------------------------------------------
// Rendering

#[derive(Debug, Clone, PartialEq, Eq)]
enum Banner {
    Info(String),
    Warning(String),
    Error(String),
    ErrorList { heading: String, items: Vec<String> },
}

fn notice_banners(notice: Option<DeadlineNotice>) -> Vec<Banner> {
    match notice {
        Some(DeadlineNotice::Late) => vec![Banner::Warning(
            "Submitted during the grace period: the deadline has passed but submissions are still being accepted.".to_string(),
        )],
        Some(DeadlineNotice::ClosingSoon { remaining }) => vec![Banner::Warning(format!(
            "Submitted close to the deadline: {remaining} remaining!"
        ))],
        None => Vec::new(),
    }
}

fn render_banner(banner: &Banner) -> String {
    match banner {
        Banner::Info(text) => banner_div("info", text),
        Banner::Warning(text) => banner_div("warning", text),
        Banner::Error(text) => banner_div("error", text),
        Banner::ErrorList { heading, items } => {
            let mut list = String::new();
            for item in items {
                list.push_str(&format!("<li>{}</li>", escape_html(item)));
            }
            format!(
                "<div class=\"banner error\"><p>{}</p><ul>{list}</ul></div>",
                escape_html(heading)
            )
        }
    }
}

fn banner_div(class: &str, text: &str) -> String {
    format!("<div class=\"banner {class}\">{}</div>", escape_html(text))
}

fn render_banners(banners: &[Banner]) -> String {
    banners.iter().map(render_banner).collect()
}

/// Deadline status banners for the form page. The bool is true when the
/// form is closed and must not be rendered.
fn deadline_banners(policy: Option<&DeadlineConfig>, now: NaiveDateTime) -> (Vec<Banner>, bool) {
    let Some(policy) = policy else {
        return (Vec::new(), false);
    };

    if policy.is_past_deadline(now) {
        if policy.is_within_grace_period(now) {
            let ends = policy.grace_ends_at().format(DISPLAY_FORMAT);
            (
                vec![
                    Banner::Error(
                        "The RSVP deadline has passed, but submissions are still being accepted for a limited time."
                            .to_string(),
                    ),
                    Banner::Warning(format!("Grace period ends: {ends}")),
                ],
                false,
            )
        } else {
            (
                vec![Banner::Error(
                    "The RSVP deadline has passed. New submissions are no longer accepted."
                        .to_string(),
                )],
                true,
            )
        }
    } else if policy.is_within_warning_period(now) {
        let remaining = format_time_remaining(policy.time_until_deadline(now));
        let cutoff = policy.cutoff.format(DISPLAY_FORMAT);
        (
            vec![Banner::Warning(format!(
                "RSVP deadline approaching! Time remaining: {remaining}. Deadline: {cutoff}"
            ))],
            false,
        )
    } else {
        let remaining = format_time_remaining(policy.time_until_deadline(now));
        let cutoff = policy.cutoff.format(DISPLAY_FORMAT);
        (
            vec![Banner::Info(format!(
                "RSVP deadline: {cutoff} ({remaining} remaining)"
            ))],
            false,
        )
    }
}

fn render_rsvp_page(
    config: &AppConfig,
    policy: Option<&DeadlineConfig>,
    form: &FormSessionState,
    now: NaiveDateTime,
    extra: &[Banner],
) -> String {
    let heading = format!(
        "<h1>{} RSVP</h1><p>{}</p>",
        escape_html(&config.site.event_name),
        escape_html(&config.site.welcome_message)
    );

    if form.is_submitted() {
        let body = format!(
            "{heading}\
             <div class=\"banner success\">RSVP submitted successfully! Thank you for your response.</div>\
             {}\
             <form method=\"post\" action=\"/rsvp\">\
             <button type=\"submit\" name=\"action\" value=\"reset\" class=\"primary\">Submit Another RSVP</button>\
             </form>\
             <p class=\"hint\">If you need to submit another RSVP or make changes, please use the button above.</p>",
            render_banners(extra)
        );
        return page(&config.site.title, &site_header(config), &body);
    }

    let (mut banners, closed) = deadline_banners(policy, now);
    banners.extend(extra.iter().cloned());

    if closed {
        let body = format!(
            "{heading}{}\
             <p class=\"hint\">Please contact the hosts directly if you need to make changes to your RSVP.</p>",
            render_banners(&banners)
        );
        return page(&config.site.title, &site_header(config), &body);
    }

    let body = format!(
        "{heading}{}{}",
        render_banners(&banners),
        render_form(config, &form.draft)
    );
    page(&config.site.title, &site_header(config), &body)
}

fn render_form(config: &AppConfig, draft: &RsvpDraft) -> String {
    let yes_checked = if draft.attending == Attendance::Yes { " checked" } else { "" };
    let no_checked = if draft.attending == Attendance::No { " checked" } else { "" };

    let mut guests = String::new();
    for (i, guest) in draft.guests.iter().enumerate() {
        guests.push_str(&render_guest_card(config, i, guest));
    }

    format!(
        "<form method=\"post\" action=\"/rsvp\">\
         <fieldset class=\"attendance\">\
         <legend>Will you be attending?</legend>\
         <label><input type=\"radio\" name=\"attending\" value=\"yes\"{yes_checked}> Yes, I/we will attend</label>\
         <label><input type=\"radio\" name=\"attending\" value=\"no\"{no_checked}> No, I/we cannot attend</label>\
         </fieldset>\
         <h2>Contact Information</h2>\
         <label>Primary Contact Name*<input type=\"text\" name=\"contact_name\" value=\"{}\"></label>\
         <label>Email Address<input type=\"email\" name=\"contact_email\" value=\"{}\"></label>\
         <label>Phone Number<input type=\"tel\" name=\"contact_phone\" value=\"{}\"></label>\
         <h2>Guest Details &amp; Menu Choices</h2>\
         <p>If attending, please provide details for each guest:</p>\
         {guests}\
         <button type=\"submit\" name=\"action\" value=\"add_guest\" class=\"secondary\">Add Another Guest</button>\
         <h2>Additional Comments</h2>\
         <label>Any additional comments or special requests:\
         <textarea name=\"comments\" rows=\"4\">{}</textarea></label>\
         <div class=\"actions\">\
         <button type=\"submit\" name=\"action\" value=\"submit\" class=\"primary\">Submit RSVP</button>\
         </div>\
         </form>",
        escape_html(&draft.contact_name),
        escape_html(&draft.contact_email),
        escape_html(&draft.contact_phone),
        escape_html(&draft.comments),
    )
}

fn render_guest_card(config: &AppConfig, index: usize, guest: &DraftGuest) -> String {
    let number = index + 1;
    let remove = if index > 0 {
        format!(
            "<button type=\"submit\" name=\"action\" value=\"remove_{index}\" class=\"secondary\">Remove</button>"
        )
    } else {
        String::new()
    };

    format!(
        "<div class=\"guest-card\">\
         <h3>Guest {number}</h3>{remove}\
         <label>Guest Name*<input type=\"text\" name=\"guest_name_{index}\" value=\"{}\" placeholder=\"Enter guest name\"></label>\
         <label>Starter Choice*<select name=\"starter_{index}\">{}</select></label>\
         <label>Main Course*<select name=\"main_{index}\">{}</select></label>\
         <label>Dessert Choice*<select name=\"dessert_{index}\">{}</select></label>\
         <label>Dietary Requirements/Allergies\
         <textarea name=\"dietary_{index}\" rows=\"2\" placeholder=\"Please list any allergies or dietary requirements\">{}</textarea></label>\
         </div>",
        escape_html(&guest.name),
        select_options(&config.menu.starters, &guest.starter),
        select_options(&config.menu.mains, &guest.main),
        select_options(&config.menu.desserts, &guest.dessert),
        escape_html(&guest.dietary),
    )
}

fn select_options(options: &[String], selected: &str) -> String {
    let mut out = String::from("<option value=\"\"></option>");
    for option in options {
        let escaped = escape_html(option);
        let flag = if option == selected { " selected" } else { "" };
        out.push_str(&format!("<option value=\"{escaped}\"{flag}>{escaped}</option>"));
    }
    out
}

fn render_event_page(config: &AppConfig) -> String {
    let event = &config.event;
    let mut body = format!(
        "<h1>{}</h1><p>{}</p>",
        escape_html(&config.site.event_name),
        escape_html(&event.welcome)
    );

    if !event.date.is_empty() || !event.time.is_empty() {
        body.push_str(&format!(
            "<section><h2>Date &amp; Time</h2><p><strong>{}</strong></p><p>{}</p></section>",
            escape_html(&event.date),
            escape_html(&event.time)
        ));
    }
    if let Some(venue) = &event.ceremony {
        body.push_str(&render_venue("Ceremony Venue", venue));
    }
    if let Some(venue) = &event.reception {
        body.push_str(&render_venue("Reception Venue", venue));
    }

    body.push_str("<section><h2>Menu</h2>");
    body.push_str(&render_menu_list("Starters", &config.menu.starters));
    body.push_str(&render_menu_list("Main Courses", &config.menu.mains));
    body.push_str(&render_menu_list("Desserts", &config.menu.desserts));
    body.push_str("</section>");

    if !event.notes.is_empty() {
        body.push_str(&format!(
            "<section><h2>Good to Know</h2><p>{}</p></section>",
            escape_html(&event.notes)
        ));
    }
    body.push_str("<p><a class=\"button primary\" href=\"/rsvp\">RSVP now</a></p>");

    page(&config.site.title, &site_header(config), &body)
}

fn render_venue(title: &str, venue: &crate::config::VenueConfig) -> String {
    let mut out = format!(
        "<section><h2>{title}</h2><h3>{}</h3><p>{}</p>",
        escape_html(&venue.name),
        escape_html(&venue.address)
    );
    if !venue.details.is_empty() {
        out.push_str(&format!("<p>{}</p>", escape_html(&venue.details)));
    }
    if !venue.map_url.is_empty() {
        out.push_str(&format!(
            "<p><a href=\"{}\">Open in Maps</a></p>",
            escape_html(&venue.map_url)
        ));
    }
    out.push_str("</section>");
    out
}

fn render_menu_list(title: &str, options: &[String]) -> String {
    let mut out = format!("<h3>{title}</h3><ul>");
    for option in options {
        out.push_str(&format!("<li>{}</li>", escape_html(option)));
    }
    out.push_str("</ul>");
    out
}

fn render_login_page(config: &AppConfig, failure: Option<&str>) -> String {
    let banner = match failure {
        Some(text) => render_banner(&Banner::Error(text.to_string())),
        None => String::new(),
    };
    let body = format!(
        "<h1>Admin Login</h1>\
         <p>Please enter the password to access the RSVP admin dashboard.</p>\
         {banner}\
         <form method=\"post\" action=\"/admin/login\">\
         <label>Password<input type=\"password\" name=\"password\"></label>\
         <button type=\"submit\" class=\"primary\">Login</button>\
         </form>\
         <p class=\"hint\">If you are a guest looking to submit your RSVP, please use the <a href=\"/rsvp\">RSVP form</a> instead.</p>"
    );
    page(&config.site.title, &site_header(config), &body)
}

fn render_summary_page(config: &AppConfig, rows: &[ResponseRow]) -> String {
    let body = if rows.is_empty() {
        "<h1>RSVP Overview</h1><p>No RSVPs have been submitted yet.</p>".to_string()
    } else {
        let summary = report::summarize(rows);
        let mut recent = String::new();
        for row in report::recent_rows(rows, 10) {
            let date = row.submitted_at.split(' ').next().unwrap_or("");
            let guest = if row.attending == Attendance::Yes && !row.guest_name.is_empty() {
                format!("<span class=\"guest\">Guest: {}</span>", escape_html(&row.guest_name))
            } else {
                String::new()
            };
            let comment = if row.comments.is_empty() {
                String::new()
            } else {
                format!("<p class=\"comment\">{}</p>", escape_html(&row.comments))
            };
            recent.push_str(&format!(
                "<li><strong>{}</strong>{guest}\
                 <span class=\"status {}\">{}</span> <span class=\"date\">{date}</span>{comment}</li>",
                escape_html(&row.contact_name),
                if row.attending == Attendance::Yes { "yes" } else { "no" },
                row.attending.as_str(),
            ));
        }

        format!(
            "<h1>RSVP Overview</h1>\
             <div class=\"metrics\">\
             <div class=\"metric\"><span>Total Responses</span><strong>{}</strong></div>\
             <div class=\"metric\"><span>Attending</span><strong>{}</strong></div>\
             <div class=\"metric\"><span>Not Attending</span><strong>{}</strong></div>\
             <div class=\"metric\"><span>Total Guests</span><strong>{}</strong></div>\
             </div>\
             <h2>Recent RSVPs</h2><ul class=\"recent\">{recent}</ul>",
            summary.total_responses,
            summary.attending_responses,
            summary.not_attending_responses,
            summary.total_guests,
        )
    };
    page(&config.site.title, &admin_header(config, "summary"), &body)
}

fn render_menu_page(config: &AppConfig, rows: &[ResponseRow]) -> String {
    let menu = report::menu_report(rows);
    let total_guests = report::summarize(rows).total_guests;

    let body = if total_guests == 0 {
        "<h1>Menu Planning</h1><p>No attending guests yet to display menu planning data.</p>"
            .to_string()
    } else {
        let dietary = if menu.dietary.is_empty() {
            "<p>No special dietary requirements reported.</p>".to_string()
        } else {
            let mut out = String::from("<ul>");
            for note in &menu.dietary {
                out.push_str(&format!(
                    "<li><strong>{}:</strong> {}</li>",
                    escape_html(&note.guest_name),
                    escape_html(&note.requirement)
                ));
            }
            out.push_str("</ul>");
            out
        };

        format!(
            "<h1>Menu Planning</h1><p>{total_guests} attending guests</p>\
             <div class=\"columns\">\
             <section><h2>Starters</h2>{}</section>\
             <section><h2>Main Courses</h2>{}</section>\
             <section><h2>Desserts</h2>{}</section>\
             </div>\
             <h2>Dietary Requirements &amp; Allergies</h2>{dietary}",
            render_counts(&menu.starters),
            render_counts(&menu.mains),
            render_counts(&menu.desserts),
        )
    };
    page(&config.site.title, &admin_header(config, "menu"), &body)
}

fn render_counts(counts: &[report::ChoiceCount]) -> String {
    if counts.is_empty() {
        return "<p>No choices recorded.</p>".to_string();
    }
    let mut out = String::from("<ul>");
    for entry in counts {
        out.push_str(&format!(
            "<li><strong>{}:</strong> {} guests</li>",
            escape_html(&entry.choice),
            entry.count
        ));
    }
    out.push_str("</ul>");
    out
}

fn render_data_page(config: &AppConfig, rows: &[ResponseRow], q: &str) -> String {
    let body = if rows.is_empty() {
        "<h1>Data Export</h1><p>No RSVPs have been submitted yet.</p>".to_string()
    } else {
        let filtered = report::search_rows(rows, q);
        let table = if filtered.is_empty() {
            "<p>No data matches your search criteria.</p>".to_string()
        } else {
            let mut table = String::from(
                "<table><thead><tr>\
                 <th>Submitted</th><th>Contact</th><th>Email</th><th>Phone</th><th>Status</th>\
                 <th>Guest</th><th>Starter</th><th>Main</th><th>Dessert</th><th>Dietary Notes</th><th>Comments</th>\
                 </tr></thead><tbody>",
            );
            for row in &filtered {
                table.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                     <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&row.submitted_at),
                    escape_html(&row.contact_name),
                    escape_html(&row.contact_email),
                    escape_html(&row.contact_phone),
                    row.attending.as_str(),
                    escape_html(&row.guest_name),
                    escape_html(&row.starter_choice),
                    escape_html(&row.main_choice),
                    escape_html(&row.dessert_choice),
                    escape_html(&row.dietary_requirements),
                    escape_html(&row.comments),
                ));
            }
            table.push_str("</tbody></table>");
            table.push_str(&format!(
                "<p>Showing {} of {} total responses</p>",
                filtered.len(),
                rows.len()
            ));
            table
        };

        format!(
            "<h1>Data Export</h1>\
             <section><h2>Export Data</h2>\
             <p><a class=\"button\" href=\"/admin/export.csv\">Download All Data (CSV)</a> \
             <a class=\"button\" href=\"/admin/export.csv?scope=attending\">Download Attending Only (CSV)</a></p>\
             </section>\
             <section><h2>Search &amp; Filter</h2>\
             <form method=\"get\" action=\"/admin/data\">\
             <label>Search by contact name or guest name:\
             <input type=\"text\" name=\"q\" value=\"{}\"></label>\
             <button type=\"submit\">Search</button>\
             </form></section>\
             <h2>Complete RSVP Data</h2>{table}",
            escape_html(q)
        )
    };
    page(&config.site.title, &admin_header(config, "data"), &body)
}

// ---------------------------------------------------------------------------
// Shell

const STYLE: &str = "\
body{font-family:Georgia,serif;margin:0;color:#33302e;background:#faf7f2}\
main{max-width:56rem;margin:0 auto;padding:1rem 1.5rem 3rem}\
header{background:#2f3e46;color:#fff;padding:0.8rem 1.5rem;display:flex;justify-content:space-between;align-items:baseline;flex-wrap:wrap}\
header a{color:#fff;text-decoration:none}\
header nav a{margin-left:1rem;font-size:0.95rem}\
header .brand{font-size:1.2rem;font-weight:bold}\
.site-banner{width:100%;display:block}\
.banner{padding:0.7rem 1rem;border-radius:6px;margin:0.8rem 0}\
.banner.info{background:#e3edf7;border:1px solid #9dbcd9}\
.banner.success{background:#e5f3e5;border:1px solid #8fbf8f}\
.banner.warning{background:#fdf3dc;border:1px solid #e0c068}\
.banner.error{background:#f9e2e0;border:1px solid #d98a83}\
label{display:block;margin:0.6rem 0}\
input[type=text],input[type=email],input[type=tel],input[type=password],select,textarea{display:block;width:100%;max-width:24rem;padding:0.4rem;margin-top:0.2rem;border:1px solid #bbb;border-radius:4px;font:inherit}\
fieldset.attendance{border:none;padding:0}\
fieldset.attendance label{display:inline-block;margin-right:1.5rem}\
.guest-card{border:1px solid #ddd;border-radius:8px;padding:0.8rem 1rem;margin:0.8rem 0;background:#fff}\
button,.button{font:inherit;padding:0.45rem 1.1rem;border-radius:5px;border:1px solid #2f3e46;background:#fff;color:#2f3e46;cursor:pointer;text-decoration:none;display:inline-block}\
button.primary,.button.primary{background:#2f3e46;color:#fff}\
.metrics{display:flex;gap:1rem;flex-wrap:wrap;margin:1rem 0}\
.metric{border:1px solid #ddd;border-radius:8px;padding:0.8rem 1.2rem;background:#fff;text-align:center}\
.metric span{display:block;font-size:0.85rem;color:#666}\
.metric strong{font-size:1.6rem}\
.columns{display:flex;gap:1.5rem;flex-wrap:wrap}\
.columns section{flex:1;min-width:12rem}\
ul.recent{list-style:none;padding:0}\
ul.recent li{border-bottom:1px solid #e5e0d8;padding:0.6rem 0}\
.status.yes{color:#2c7a2c;margin-left:0.5rem}\
.status.no{color:#b03a30;margin-left:0.5rem}\
.date,.guest{color:#666;margin-left:0.5rem}\
.comment{color:#555;font-style:italic;margin:0.2rem 0 0}\
table{border-collapse:collapse;width:100%;font-size:0.85rem;background:#fff}\
th,td{border:1px solid #ddd;padding:0.35rem 0.5rem;text-align:left}\
th{background:#f0ece5}\
.hint{color:#666;font-size:0.9rem}\
.actions{margin-top:1rem}";

fn site_header(config: &AppConfig) -> String {
    let banner = match &config.site.banner_image {
        Some(url) => format!("<img class=\"site-banner\" src=\"{}\" alt=\"\">", escape_html(url)),
        None => String::new(),
    };
    format!(
        "<header><span class=\"brand\"><a href=\"/\">{}</a></span>\
         <nav><a href=\"/\">Event Info</a><a href=\"/rsvp\">RSVP</a></nav></header>{banner}",
        escape_html(&config.site.event_name)
    )
}

fn admin_header(config: &AppConfig, active: &str) -> String {
    let tab = |slug: &str, href: &str, label: &str| {
        if slug == active {
            format!("<a href=\"{href}\" aria-current=\"page\"><strong>{label}</strong></a>")
        } else {
            format!("<a href=\"{href}\">{label}</a>")
        }
    };
    format!(
        "<header><span class=\"brand\"><a href=\"/\">{} Admin</a></span>\
         <nav>{}{}{}\
         <form method=\"post\" action=\"/admin/logout\" style=\"display:inline;margin-left:1rem\">\
         <button type=\"submit\">Logout</button></form>\
         </nav></header>",
        escape_html(&config.site.event_name),
        tab("summary", "/admin", "Summary"),
        tab("menu", "/admin/menu", "Menu Planning"),
        tab("data", "/admin/data", "Data Export"),
    )
}

fn page(title: &str, header: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n<main>\n{}\n</main>\n</body>\n</html>\n",
        escape_html(title),
        STYLE,
        header,
        body
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
