//! Synthetic task generation.
//!
//! Produces a plausible, internally consistent collection of control tasks
//! for demonstration and testing. Generation cannot fail and touches no
//! state beyond the supplied RNG; the same seed always yields the same
//! collection.

use chrono::{DateTime, Duration, Local};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::fields::{Priority, Status, TeamView};
use crate::task::{InfoRow, Task, TaskFile, TaskNote};

/// Identifier of the first generated task. Later tasks count up from here,
/// and `TaskStore::add` continues past the highest.
pub const BASE_ID: u64 = 167_175;

/// Fixed control categories shown in the filter sheet.
pub const CATEGORIES: &[&str] = &[
    "Final PnL Sign-Off",
    "T+3 Clean PnL Sign-Off",
    "Employee Licensing & Registrations",
    "Anomalous Trading",
    "Cancel and Amend Review",
    "Supervisor Dashboard Signoff",
    "Independent Price Verification (IPV)",
    "Trade Surveillance Alert",
];

/// Subcategories, present only for categories that have them.
pub fn subcategories_for(category: &str) -> &'static [&'static str] {
    match category {
        "Final PnL Sign-Off" => &[
            "Equity Derivatives | Options Trading | Institutional Products",
            "Fixed Income | Government Bonds | Institutional Trading",
            "Currency Exchange | FX Derivatives",
        ],
        "Employee Licensing & Registrations" => &[
            "Securities Dealer Transaction Review",
            "Employee Licensing & Registration Exception",
        ],
        _ => &[],
    }
}

const CONTROL_NAMES: &[&str] = &[
    "Rates | Liquid Products - Derivs | Institutional Swaps CLT | T+3 CLEAN PnL Sign-Off",
    "Rates | Liquid Products - Derivs | Institutional Options | PnL Sign-Off",
    "Rates | Liquid Products - Derivs | Institutional Swaps | PnL Sign-Off",
    "Fixed Income | Government Bonds | Institutional Trading",
    "Equity Derivatives | Options Trading | Institutional Products",
    "WashTrade Detection",
    "FrontRunning Analysis",
    "Periodic Dashboard Signoff",
    "OffMarket Transaction Review",
    "CrossTrade Validation",
    "Currency Exchange | FX Derivatives",
];

const ASSIGNEES: &[&str] = &[
    "Not Delegated",
    "Alex Thompson",
    "Sarah Mitchell",
    "Michael Rodriguez",
    "System Administrator",
    "Emma Johnson",
];

const WORKFLOW_STEPS: &[&str] = &[
    "Pending Desk Approval of T+3 CLEAN PnL",
    "Pending Finance Review",
    "Awaiting Supervisor Approval",
    "Under Investigation",
];

const DESCRIPTIONS: &[&str] = &[
    "This control enables delivery of desk level T+1 Final PnL by Finance Product Controllers for review and acknowledgment by each trading desk. The process ensures accurate position valuation and risk assessment across all trading activities.",
    "Automated surveillance system has flagged potential anomalous trading patterns requiring immediate review and investigation. Analysis includes trade timing, volume patterns, and market impact assessment.",
    "Monthly licensing verification process to ensure all trading personnel maintain current regulatory certifications and registrations. Includes review of continuing education requirements and compliance status.",
    "Independent price verification control for complex derivative instruments. Requires validation of pricing models, market data sources, and valuation methodologies used in daily mark-to-market processes.",
    "Supervisor dashboard review covering key risk metrics, trading limits, and operational controls. Includes sign-off on daily risk reports and exception handling procedures.",
    "Trade surveillance alert requiring investigation of potentially suspicious trading activity. Analysis includes pattern recognition, timing analysis, and compliance with market regulations.",
];

const ALERT_TEXTS: &[&str] = &[
    "Equity Options Clean PnL variance detected: Position reconciliation required for institutional trading desk",
    "Fixed Income trading limits exceeded: Review required for government bond trading activities",
    "Currency derivatives pricing model validation needed for FX options portfolio",
    "Employee certification expiring within 30 days: Renewal process must be initiated",
    "Anomalous trading pattern detected: Large block trades executed outside normal market hours",
    "Cross-trade validation failed: Manual review required for institutional client transactions",
];

const FILE_NAMES: &[&str] = &[
    "Portfolio_Clean_Flash.xlsm",
    "Derivatives_Portfolio_flash.xlsx",
    "trading_details.csv",
    "Options_Analysis_(3).xlsx",
    "Risk_Report_Summary.pdf",
    "Compliance_Review.docx",
];

const NOTE_CONTENTS: &[&str] = &[
    "Equity Options Clean PnL variance: -1,402,103 USD",
    "Please find the Final P&L email for the Fixed Income Options portfolio",
    "Reconciliation attached; variance within tolerance",
    "Escalated to desk supervisor for acknowledgment",
];

const APPLICATIONS: &[&str] = &["MUREX", "CALYPSO", "SUMMIT", "ATLAS"];

const TEAM_VIEWS: &[TeamView] = &[
    TeamView::Owner,
    TeamView::Pending,
    TeamView::Watcher,
    TeamView::Rfi,
    TeamView::Team,
    TeamView::Extended,
];

const PRIORITIES: &[Priority] = &[
    Priority::Low,
    Priority::Medium,
    Priority::High,
    Priority::Critical,
];

fn pick<'a, T: ?Sized>(rng: &mut StdRng, pool: &'a [&'a T]) -> &'a T {
    pool[rng.gen_range(0..pool.len())]
}

/// Generate `count` synthetic tasks around `now`.
///
/// Status distribution skews toward outstanding (~75%), due dates spread
/// across a ±30-day window, every task carries at least one note, and a
/// majority (but not all) carry a file reference.
pub fn generate_tasks(count: usize, now: DateTime<Local>, rng: &mut StdRng) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(count);

    for i in 0..count {
        let category = pick(rng, CATEGORIES);
        let sub_pool = subcategories_for(category);
        let subcategory = if sub_pool.is_empty() {
            None
        } else {
            Some(pick(rng, sub_pool).to_string())
        };

        let status = if rng.gen_bool(0.25) {
            Status::Completed
        } else {
            Status::Outstanding
        };

        let due = now + Duration::days(rng.gen_range(-30..=30))
            + Duration::minutes(rng.gen_range(0..1_440));
        let created = due - Duration::hours(rng.gen_range(1..=14 * 24));

        let workflow_step = if status == Status::Completed {
            "COMPLETE".to_string()
        } else {
            pick(rng, WORKFLOW_STEPS).to_string()
        };

        let (control_type, workflow_name) = if category.contains("PnL") {
            ("Final PnL Sign-Off", "PnL Sign-Off")
        } else {
            ("Trade Surveillance Alert", "Transaction Monitoring")
        };

        let author = if rng.gen_bool(0.5) {
            ("Sarah Mitchell", "SM")
        } else {
            ("Emma Johnson", "EJ")
        };
        let notes = vec![TaskNote {
            author: author.0.to_string(),
            content: pick(rng, NOTE_CONTENTS).to_string(),
            timestamp: now - Duration::minutes(rng.gen_range(0..3 * 24 * 60)),
            avatar: Some(author.1.to_string()),
            approved: rng.gen_bool(0.3),
        }];

        let files = if rng.gen_bool(0.6) {
            vec![TaskFile {
                name: pick(rng, FILE_NAMES).to_string(),
                size: rng.gen_range(100_000..5_100_000),
                mime_type: "application/vnd.ms-excel.sheet.macroEnabled.12".to_string(),
                reference: "#".to_string(),
            }]
        } else {
            Vec::new()
        };

        // Reconciliation rows back the additional-info table for PnL
        // controls only.
        let info_rows = if category.contains("PnL") {
            (0..rng.gen_range(1..=3))
                .map(|_| {
                    let expected = rng.gen_range(-2_000_000.0..2_000_000.0f64);
                    InfoRow {
                        application: pick(rng, APPLICATIONS).to_string(),
                        account: format!("ACCT-{:05}", rng.gen_range(0..100_000)),
                        expected,
                        actual: expected + rng.gen_range(-50_000.0..50_000.0),
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        tasks.push(Task {
            id: (BASE_ID + i as u64).to_string(),
            title: format!("{} - Control Review {}", category, i + 1),
            description: pick(rng, DESCRIPTIONS).to_string(),
            status,
            priority: PRIORITIES[rng.gen_range(0..PRIORITIES.len())],
            due,
            created,
            assigned_to: pick(rng, ASSIGNEES).to_string(),
            category: category.to_string(),
            subcategory,
            control_name: pick(rng, CONTROL_NAMES).to_string(),
            control_type: control_type.to_string(),
            workflow_name: workflow_name.to_string(),
            workflow_step,
            alert_text: if rng.gen_bool(0.4) {
                Some(pick(rng, ALERT_TEXTS).to_string())
            } else {
                None
            },
            team_view: Some(TEAM_VIEWS[rng.gen_range(0..TEAM_VIEWS.len())]),
            responsible_supervisor: if rng.gen_bool(0.7) {
                Some("u395315".to_string())
            } else {
                None
            },
            responsible_employee: if rng.gen_bool(0.8) {
                Some(pick(rng, ASSIGNEES).to_string())
            } else {
                None
            },
            notes,
            files,
            info_rows,
        });
    }

    tasks
}

/// RNG for generation: seeded when a seed is given, otherwise from entropy.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated() -> Vec<Task> {
        let mut rng = rng_from_seed(Some(42));
        generate_tasks(100, Local::now(), &mut rng)
    }

    #[test]
    fn test_ids_are_unique_and_sequential() {
        let tasks = generated();
        assert_eq!(tasks.len(), 100);
        for (i, task) in tasks.iter().enumerate() {
            assert_eq!(task.id, (BASE_ID + i as u64).to_string());
        }
    }

    #[test]
    fn test_same_seed_same_collection() {
        let now = Local::now();
        let a = generate_tasks(20, now, &mut rng_from_seed(Some(7)));
        let b = generate_tasks(20, now, &mut rng_from_seed(Some(7)));
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.title, y.title);
            assert_eq!(x.due, y.due);
            assert_eq!(x.status, y.status);
        }
    }

    #[test]
    fn test_status_skews_outstanding() {
        let tasks = generated();
        let outstanding = tasks
            .iter()
            .filter(|t| t.status == Status::Outstanding)
            .count();
        assert!(outstanding > tasks.len() / 2);
    }

    #[test]
    fn test_every_task_has_a_note_most_have_files() {
        let tasks = generated();
        assert!(tasks.iter().all(|t| !t.notes.is_empty()));
        let with_files = tasks.iter().filter(|t| !t.files.is_empty()).count();
        assert!(with_files > tasks.len() / 3);
        assert!(with_files < tasks.len());
    }

    #[test]
    fn test_due_dates_within_window() {
        let now = Local::now();
        let tasks = generate_tasks(100, now, &mut rng_from_seed(Some(1)));
        for task in &tasks {
            let days = (task.due - now).num_days();
            assert!((-31..=31).contains(&days), "due {} days out", days);
        }
    }

    #[test]
    fn test_subcategories_only_where_defined() {
        for task in generated() {
            if task.subcategory.is_some() {
                assert!(!subcategories_for(&task.category).is_empty());
            }
        }
    }

    #[test]
    fn test_completed_tasks_have_complete_step() {
        for task in generated() {
            if task.status == Status::Completed {
                assert_eq!(task.workflow_step, "COMPLETE");
            }
        }
    }
}
