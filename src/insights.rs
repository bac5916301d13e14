//! Read-only projections over an account/profile/experience snapshot.
//!
//! Nothing here is stored: profile completeness, badges, the admin dashboard and the
//! activity report are all recomputed from whatever the repository returns.

use chrono::{DateTime, Duration, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Account, Badge, InterviewExperience, InterviewStatus, Profile, TaskExperience};

const RECENT_ACTIVITY_LIMIT: usize = 20;
const MOST_ACTIVE_LIMIT: usize = 5;
const INTERVIEW_VETERAN_THRESHOLD: usize = 5;

// --- Profile projections ---

/// Percentage (0..=100, rounded) of filled facets among first name, last name, bio,
/// location, birth date and avatar.
pub fn profile_completeness(account: &Account, profile: &Profile) -> u8 {
    let facets = [
        !account.first_name.trim().is_empty(),
        !account.last_name.trim().is_empty(),
        !profile.bio.trim().is_empty(),
        !profile.location.trim().is_empty(),
        profile.birth_date.is_some(),
        !profile.avatar.trim().is_empty(),
    ];
    let filled = facets.iter().filter(|f| **f).count();
    ((filled * 100 + facets.len() / 2) / facets.len()) as u8
}

/// Activity badges earned by a user, in declaration order.
pub fn badges(interviews: &[InterviewExperience], tasks: &[TaskExperience]) -> Vec<Badge> {
    let earned = [
        (Badge::FirstInterview, !interviews.is_empty()),
        (Badge::InterviewVeteran, interviews.len() >= INTERVIEW_VETERAN_THRESHOLD),
        (
            Badge::OfferReceived,
            interviews.iter().any(|i| i.status == InterviewStatus::Selected),
        ),
        (Badge::Builder, !tasks.is_empty()),
        (Badge::OpenSource, tasks.iter().any(|t| !t.github_url.is_empty())),
        (Badge::CurrentlyWorking, tasks.iter().any(|t| t.currently_working)),
    ];
    earned
        .into_iter()
        .filter_map(|(badge, has)| has.then_some(badge))
        .collect()
}

// --- Admin dashboard ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SubmissionCounts {
    pub interviews: u32,
    pub tasks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RealTimeMetrics {
    pub active_users_today: u32,
    pub new_registrations_today: u32,
    pub submissions_today: SubmissionCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct WeeklyTrends {
    pub new_users: u32,
    pub interview_submissions: u32,
    pub task_submissions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ActiveUser {
    pub username: String,
    pub email: String,
    pub total_submissions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Engagement {
    pub users_with_interviews: u32,
    pub users_with_tasks: u32,
    pub most_active_users: Vec<ActiveUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ActivityKind {
    Interview,
    Task,
    Registration,
}

/// One entry of the recent activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub user: String,
    pub action: String,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SystemHealth {
    pub total_users: u32,
    pub total_content: u32,
    pub database_status: String,
    #[ts(type = "string")]
    pub last_updated: DateTime<Utc>,
}

/// DashboardMetrics
///
/// Body of GET /admin/dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardMetrics {
    pub real_time: RealTimeMetrics,
    pub weekly_trends: WeeklyTrends,
    pub engagement: Engagement,
    pub recent_activity: Vec<ActivityItem>,
    pub system_health: SystemHealth,
}

fn count<T>(items: &[T], keep: impl Fn(&T) -> bool) -> u32 {
    items.iter().filter(|item| keep(item)).count() as u32
}

/// Computes every dashboard section from one snapshot taken at `now`.
pub fn dashboard(
    accounts: &[Account],
    interviews: &[InterviewExperience],
    tasks: &[TaskExperience],
    now: DateTime<Utc>,
) -> DashboardMetrics {
    let today = now.date_naive();
    let week_ago = now - Duration::days(7);

    let real_time = RealTimeMetrics {
        active_users_today: count(accounts, |a| a.last_login.is_some_and(|t| t.date_naive() == today)),
        new_registrations_today: count(accounts, |a| a.created_at.date_naive() == today),
        submissions_today: SubmissionCounts {
            interviews: count(interviews, |i| i.created_at.date_naive() == today),
            tasks: count(tasks, |t| t.created_at.date_naive() == today),
        },
    };

    let weekly_trends = WeeklyTrends {
        new_users: count(accounts, |a| a.created_at >= week_ago),
        interview_submissions: count(interviews, |i| i.created_at >= week_ago),
        task_submissions: count(tasks, |t| t.created_at >= week_ago),
    };

    DashboardMetrics {
        real_time,
        weekly_trends,
        engagement: engagement(accounts, interviews, tasks),
        recent_activity: recent_activity(accounts, interviews, tasks),
        system_health: SystemHealth {
            total_users: accounts.len() as u32,
            total_content: (interviews.len() + tasks.len()) as u32,
            database_status: "healthy".to_string(),
            last_updated: now,
        },
    }
}

fn engagement(accounts: &[Account], interviews: &[InterviewExperience], tasks: &[TaskExperience]) -> Engagement {
    let mut interview_counts: HashMap<Uuid, u32> = HashMap::new();
    for interview in interviews {
        *interview_counts.entry(interview.user_id).or_default() += 1;
    }
    let mut task_counts: HashMap<Uuid, u32> = HashMap::new();
    for task in tasks {
        *task_counts.entry(task.user_id).or_default() += 1;
    }

    let mut most_active: Vec<ActiveUser> = accounts
        .iter()
        .map(|a| ActiveUser {
            username: a.username.clone(),
            email: a.email.clone(),
            total_submissions: interview_counts.get(&a.id).copied().unwrap_or(0)
                + task_counts.get(&a.id).copied().unwrap_or(0),
        })
        .filter(|u| u.total_submissions > 0)
        .collect();
    most_active.sort_by(|a, b| {
        b.total_submissions
            .cmp(&a.total_submissions)
            .then_with(|| a.username.cmp(&b.username))
    });
    most_active.truncate(MOST_ACTIVE_LIMIT);

    Engagement {
        users_with_interviews: interview_counts.len() as u32,
        users_with_tasks: task_counts.len() as u32,
        most_active_users: most_active,
    }
}

fn newest<'a, T>(items: &'a [T], created_at: impl Fn(&T) -> DateTime<Utc>, limit: usize) -> Vec<&'a T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    sorted.truncate(limit);
    sorted
}

/// The newest interviews (10), tasks (10) and registrations (5), merged and cut to 20.
pub fn recent_activity(
    accounts: &[Account],
    interviews: &[InterviewExperience],
    tasks: &[TaskExperience],
) -> Vec<ActivityItem> {
    let usernames: HashMap<Uuid, &str> = accounts.iter().map(|a| (a.id, a.username.as_str())).collect();
    let username = |id: &Uuid| usernames.get(id).copied().unwrap_or("unknown").to_string();

    let mut items = Vec::new();
    for interview in newest(interviews, |i| i.created_at, 10) {
        items.push(ActivityItem {
            kind: ActivityKind::Interview,
            user: username(&interview.user_id),
            action: format!("Added interview at {}", interview.company_name),
            timestamp: interview.created_at,
            metadata: BTreeMap::from([
                ("company".to_string(), interview.company_name.clone()),
                ("position".to_string(), interview.position.clone()),
                ("status".to_string(), interview.status.to_string()),
            ]),
        });
    }
    for task in newest(tasks, |t| t.created_at, 10) {
        items.push(ActivityItem {
            kind: ActivityKind::Task,
            user: username(&task.user_id),
            action: format!("Added {} at {}", task.task_type, task.company_name),
            timestamp: task.created_at,
            metadata: BTreeMap::from([
                ("company".to_string(), task.company_name.clone()),
                ("position".to_string(), task.position.clone()),
                ("type".to_string(), task.task_type.to_string()),
            ]),
        });
    }
    for account in newest(accounts, |a| a.created_at, 5) {
        items.push(ActivityItem {
            kind: ActivityKind::Registration,
            user: account.username.clone(),
            action: "New user registered".to_string(),
            timestamp: account.created_at,
            metadata: BTreeMap::from([("email".to_string(), account.email.clone())]),
        });
    }

    items.sort_by_key(|item| std::cmp::Reverse(item.timestamp));
    items.truncate(RECENT_ACTIVITY_LIMIT);
    items
}

// --- Activity report (CLI) ---

/// Coarse relative label: whole days, then hours, then minutes, then "just now".
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    fn plural(n: i64, unit: &str) -> String {
        format!("{n} {unit}{} ago", if n > 1 { "s" } else { "" })
    }

    let diff = now - then;
    let days = diff.num_days();
    let seconds = diff.num_seconds() - days * 86_400;
    if days > 0 {
        plural(days, "day")
    } else if seconds > 3600 {
        plural(seconds / 3600, "hour")
    } else if seconds > 60 {
        plural(seconds / 60, "minute")
    } else {
        "just now".to_string()
    }
}

/// ActivityReport
///
/// What `show-activity` prints: everything created within the last `days` days plus
/// store totals.
#[derive(Debug, Clone)]
pub struct ActivityReport {
    pub days: i64,
    pub registrations: Vec<Account>,
    pub interviews: Vec<InterviewExperience>,
    pub tasks: Vec<TaskExperience>,
    pub total_users: usize,
    pub total_interviews: usize,
    pub total_tasks: usize,
    usernames: HashMap<Uuid, String>,
}

/// Start of a `days`-long window ending at `now`, or `None` when it falls outside the
/// representable date range.
pub fn window_start(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(TimeDelta::try_days(days)?)
}

impl ActivityReport {
    /// Returns `None` when `days` reaches past the representable date range.
    pub fn build(
        days: i64,
        accounts: Vec<Account>,
        interviews: Vec<InterviewExperience>,
        tasks: Vec<TaskExperience>,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let cutoff = window_start(now, days)?;
        let usernames = accounts.iter().map(|a| (a.id, a.username.clone())).collect();
        let (total_users, total_interviews, total_tasks) = (accounts.len(), interviews.len(), tasks.len());

        let mut registrations: Vec<Account> = accounts.into_iter().filter(|a| a.created_at >= cutoff).collect();
        registrations.sort_by_key(|a| std::cmp::Reverse(a.created_at));
        let mut interviews: Vec<InterviewExperience> =
            interviews.into_iter().filter(|i| i.created_at >= cutoff).collect();
        interviews.sort_by_key(|i| std::cmp::Reverse(i.created_at));
        let mut tasks: Vec<TaskExperience> = tasks.into_iter().filter(|t| t.created_at >= cutoff).collect();
        tasks.sort_by_key(|t| std::cmp::Reverse(t.created_at));

        Some(Self {
            days,
            registrations,
            interviews,
            tasks,
            total_users,
            total_interviews,
            total_tasks,
            usernames,
        })
    }

    pub fn recent_items(&self) -> usize {
        self.registrations.len() + self.interviews.len() + self.tasks.len()
    }

    fn username(&self, id: &Uuid) -> &str {
        self.usernames.get(id).map(String::as_str).unwrap_or("unknown")
    }

    pub fn render(&self, now: DateTime<Utc>, live: bool) -> String {
        let rule = "=".repeat(60);
        let mut lines = vec![
            String::new(),
            format!("RECursion Activity Monitor (Last {} days)", self.days),
            rule.clone(),
        ];

        lines.push(format!("\nNEW REGISTRATIONS ({}):", self.registrations.len()));
        if self.registrations.is_empty() {
            lines.push("  No new registrations".to_string());
        }
        lines.extend(self.registrations.iter().map(|account| {
            format!(
                "  - {} ({}) - {}",
                account.username,
                account.email,
                time_ago(account.created_at, now)
            )
        }));

        lines.push(format!("\nINTERVIEW EXPERIENCES SUBMITTED ({}):", self.interviews.len()));
        if self.interviews.is_empty() {
            lines.push("  No interview experiences submitted".to_string());
        }
        lines.extend(self.interviews.iter().map(|interview| {
            format!(
                "  - {}: {} - {} [{}] - {}",
                self.username(&interview.user_id),
                interview.company_name,
                interview.position,
                interview.status,
                time_ago(interview.created_at, now)
            )
        }));

        lines.push(format!("\nTASK EXPERIENCES SUBMITTED ({}):", self.tasks.len()));
        if self.tasks.is_empty() {
            lines.push("  No task experiences submitted".to_string());
        }
        lines.extend(self.tasks.iter().map(|task| {
            format!(
                "  - {}: {} - {} [{}{}] - {}",
                self.username(&task.user_id),
                task.company_name,
                task.position,
                task.task_type,
                if task.currently_working { ", current" } else { "" },
                time_ago(task.created_at, now)
            )
        }));

        lines.push("\nSUMMARY:".to_string());
        lines.push(format!("  Total Users: {}", self.total_users));
        lines.push(format!("  Total Interviews: {}", self.total_interviews));
        lines.push(format!("  Total Tasks: {}", self.total_tasks));
        lines.push(format!("  Recent Activity Items: {}", self.recent_items()));

        if live {
            lines.push("\nLIVE MODE: run this command periodically to monitor activity".to_string());
            lines.push("Command: recursion-backend show-activity --days 1".to_string());
        }
        lines.push(format!("\n{rule}"));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}
