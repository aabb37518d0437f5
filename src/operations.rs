/// Tab operations: partitioning, duration lookup, sorting and reordering

use crate::config::SorterConfig;
use crate::error::SortError;
use crate::host::TabHost;
use crate::tab_data::{Candidate, TabInfo, TabMove, VideoDuration};
use crate::watch_url::{is_watch_url, video_id};
use futures::future::{Either, join_all, select};
use std::cell::Cell;
use std::pin::pin;

/// Outcome of a completed sort run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortReport {
    pub targets: usize,
    pub known: usize,
    pub unknown: usize,
    pub moves: usize,
}

/// Split tabs into watch-page tabs and everything else, keeping window order
pub fn partition_tabs(tabs: &[TabInfo], config: &SorterConfig) -> (Vec<TabInfo>, Vec<TabInfo>) {
    tabs.iter()
        .cloned()
        .partition(|tab| is_watch_url(tab.url.as_deref(), config))
}

/// Sort by duration: shortest first, unknown durations last.
/// `sort_by` is stable, so equal durations keep their discovery order.
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| a.duration.sort_cmp(&b.duration));
}

/// Positions for every tab: sorted targets from index 0, then the others
pub fn plan_moves(sorted: &[Candidate], others: &[TabInfo]) -> Vec<TabMove> {
    sorted
        .iter()
        .map(|candidate| candidate.tab.id)
        .chain(others.iter().map(|tab| tab.id))
        .zip(0..)
        .map(|(tab_id, index)| TabMove { tab_id, index })
        .collect()
}

/// Interpret what the injected probe handed back
fn duration_from_probe(value: &serde_json::Value) -> VideoDuration {
    value
        .as_f64()
        .map(VideoDuration::from_seconds)
        .unwrap_or(VideoDuration::Unknown)
}

async fn resolve_candidate<H: TabHost>(host: &H, tab: TabInfo, timeout_ms: u32) -> Candidate {
    let probe = host.probe_tab(tab.id);

    let outcome = if timeout_ms == 0 {
        Some(probe.await)
    } else {
        let probe = pin!(probe);
        let timer = pin!(host.sleep(timeout_ms));
        match select(probe, timer).await {
            Either::Left((result, _)) => Some(result),
            Either::Right(_) => None,
        }
    };

    let duration = match outcome {
        Some(Ok(value)) => duration_from_probe(&value),
        Some(Err(e)) => {
            log::warn!("Error getting duration for tab {}: {}", tab.id, e);
            VideoDuration::Unknown
        }
        None => {
            log::warn!("Duration probe for tab {} timed out after {}ms", tab.id, timeout_ms);
            VideoDuration::Unknown
        }
    };

    Candidate { tab, duration }
}

/// Probe every target tab at once and wait for all of them.
/// A failing tab only costs its own duration.
pub async fn resolve_durations<H: TabHost>(
    host: &H,
    targets: Vec<TabInfo>,
    config: &SorterConfig,
) -> Vec<Candidate> {
    join_all(
        targets
            .into_iter()
            .map(|tab| resolve_candidate(host, tab, config.probe_timeout_ms)),
    )
    .await
}

/// Sort the current window: watch-page tabs first by duration, then the rest.
pub async fn sort_window<H: TabHost>(host: &H, config: &SorterConfig) -> Result<SortReport, SortError> {
    let tabs = host.query_tabs().await.map_err(SortError::Enumerate)?;
    let (targets, others) = partition_tabs(&tabs, config);

    if targets.is_empty() {
        log::info!("No YouTube video tabs found");
        return Ok(SortReport::default());
    }

    let mut candidates = resolve_durations(host, targets, config).await;
    sort_candidates(&mut candidates);

    for candidate in &candidates {
        log::debug!(
            "Tab {} ({}): {}s",
            candidate.tab.id,
            video_id(candidate.tab.url.as_deref(), config).unwrap_or_default(),
            candidate.duration.as_seconds()
        );
    }

    // One move at a time; a failure leaves the earlier moves in place
    let moves = plan_moves(&candidates, &others);
    for step in &moves {
        host.move_tab(step.tab_id, step.index)
            .await
            .map_err(|source| SortError::Move {
                tab_id: step.tab_id,
                index: step.index,
                source,
            })?;
    }

    let known = candidates.iter().filter(|c| c.duration.is_known()).count();
    let report = SortReport {
        targets: candidates.len(),
        known,
        unknown: candidates.len() - known,
        moves: moves.len(),
    };

    log::info!("Sorted {} YouTube tabs by duration", report.targets);
    Ok(report)
}

thread_local! {
    static RUN_IN_PROGRESS: Cell<bool> = const { Cell::new(false) };
}

/// Held for the duration of a sort run; only one may exist at a time
pub struct RunGuard(());

impl RunGuard {
    pub fn acquire() -> Option<RunGuard> {
        RUN_IN_PROGRESS.with(|running| {
            if running.replace(true) {
                None
            } else {
                Some(RunGuard(()))
            }
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        RUN_IN_PROGRESS.with(|running| running.set(false));
    }
}

/// Entry point for a trigger: runs one sort, logs and swallows any failure.
/// A trigger that arrives while a run is still going is ignored.
pub async fn run<H: TabHost>(host: &H, config: &SorterConfig) -> Option<SortReport> {
    let Some(_guard) = RunGuard::acquire() else {
        log::info!("Sort already in progress, ignoring trigger");
        return None;
    };

    match sort_window(host, config).await {
        Ok(report) => Some(report),
        Err(e) => {
            log::error!("Error sorting tabs: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use futures::executor::block_on;
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::collections::HashMap;

    enum ProbeReply {
        Seconds(f64),
        Raw(Value),
        Fail,
        Hang,
    }

    struct MockHost {
        tabs: Vec<TabInfo>,
        query_error: Option<HostError>,
        replies: HashMap<i32, ProbeReply>,
        fail_move_for: Option<i32>,
        window: RefCell<Vec<i32>>,
        moves: RefCell<Vec<TabMove>>,
        probed: RefCell<Vec<i32>>,
    }

    impl MockHost {
        fn new(tabs: Vec<TabInfo>) -> MockHost {
            let window = tabs.iter().map(|t| t.id).collect();
            MockHost {
                tabs,
                query_error: None,
                replies: HashMap::new(),
                fail_move_for: None,
                window: RefCell::new(window),
                moves: RefCell::new(Vec::new()),
                probed: RefCell::new(Vec::new()),
            }
        }

        fn reply(mut self, tab_id: i32, reply: ProbeReply) -> MockHost {
            self.replies.insert(tab_id, reply);
            self
        }

        fn window_order(&self) -> Vec<i32> {
            self.window.borrow().clone()
        }
    }

    impl TabHost for MockHost {
        async fn query_tabs(&self) -> Result<Vec<TabInfo>, HostError> {
            if let Some(e) = &self.query_error {
                return Err(e.clone());
            }
            // Report tabs in current window order, like chrome.tabs.query
            Ok(self
                .window
                .borrow()
                .iter()
                .zip(0..)
                .filter_map(|(id, index)| {
                    let tab = self.tabs.iter().find(|t| t.id == *id)?;
                    Some(TabInfo { index, ..tab.clone() })
                })
                .collect())
        }

        async fn probe_tab(&self, tab_id: i32) -> Result<Value, HostError> {
            self.probed.borrow_mut().push(tab_id);
            match self.replies.get(&tab_id) {
                Some(ProbeReply::Seconds(s)) => Ok(json!(s)),
                Some(ProbeReply::Raw(v)) => Ok(v.clone()),
                Some(ProbeReply::Fail) => Err(HostError::new("Cannot access contents of the page")),
                Some(ProbeReply::Hang) => std::future::pending().await,
                None => Ok(json!(-1)),
            }
        }

        async fn move_tab(&self, tab_id: i32, index: i32) -> Result<(), HostError> {
            if self.fail_move_for == Some(tab_id) {
                return Err(HostError::new("No tab with id"));
            }
            self.moves.borrow_mut().push(TabMove { tab_id, index });

            // chrome.tabs.move semantics: take the tab out, insert at index
            let mut window = self.window.borrow_mut();
            if let Some(pos) = window.iter().position(|id| *id == tab_id) {
                window.remove(pos);
                let index = (index as usize).min(window.len());
                window.insert(index, tab_id);
            }
            Ok(())
        }

        async fn sleep(&self, _ms: u32) {}
    }

    fn watch_tab(id: i32, video: &str) -> TabInfo {
        TabInfo::new(id, Some(format!("https://www.youtube.com/watch?v={}", video)), id)
    }

    fn other_tab(id: i32, url: &str) -> TabInfo {
        TabInfo::new(id, Some(url.to_string()), id)
    }

    fn candidate(id: i32, duration: VideoDuration) -> Candidate {
        Candidate {
            tab: watch_tab(id, "x"),
            duration,
        }
    }

    #[test]
    fn test_partition_tabs() {
        let tabs = vec![
            other_tab(0, "https://github.com/rust-lang/rust"),
            watch_tab(1, "abc"),
            TabInfo::new(2, None, 2),
            other_tab(3, "https://www.youtube.com/feed/subscriptions"),
            other_tab(4, "https://youtube.com/watch?v=def"),
            other_tab(5, "not a url"),
        ];

        let (targets, others) = partition_tabs(&tabs, &SorterConfig::default());

        let target_ids: Vec<i32> = targets.iter().map(|t| t.id).collect();
        let other_ids: Vec<i32> = others.iter().map(|t| t.id).collect();
        assert_eq!(target_ids, vec![1, 4]);
        assert_eq!(other_ids, vec![0, 2, 3, 5]);
    }

    #[test]
    fn test_sort_candidates() {
        let mut candidates = vec![
            candidate(1, VideoDuration::Known(300.0)),
            candidate(2, VideoDuration::Unknown),
            candidate(3, VideoDuration::Known(120.0)),
            candidate(4, VideoDuration::Known(45.5)),
            candidate(5, VideoDuration::Unknown),
        ];

        sort_candidates(&mut candidates);

        let ids: Vec<i32> = candidates.iter().map(|c| c.tab.id).collect();
        assert_eq!(ids, vec![4, 3, 1, 2, 5]);
    }

    #[test]
    fn test_sort_candidates_is_stable() {
        let mut candidates = vec![
            candidate(1, VideoDuration::Known(60.0)),
            candidate(2, VideoDuration::Unknown),
            candidate(3, VideoDuration::Known(60.0)),
            candidate(4, VideoDuration::Unknown),
            candidate(5, VideoDuration::Known(60.0)),
        ];

        sort_candidates(&mut candidates);

        let ids: Vec<i32> = candidates.iter().map(|c| c.tab.id).collect();
        assert_eq!(ids, vec![1, 3, 5, 2, 4]);
    }

    #[test]
    fn test_plan_moves() {
        let sorted = vec![
            candidate(7, VideoDuration::Known(10.0)),
            candidate(3, VideoDuration::Unknown),
        ];
        let others = vec![other_tab(1, "https://a.com"), other_tab(9, "https://b.com")];

        let moves = plan_moves(&sorted, &others);

        assert_eq!(
            moves,
            vec![
                TabMove { tab_id: 7, index: 0 },
                TabMove { tab_id: 3, index: 1 },
                TabMove { tab_id: 1, index: 2 },
                TabMove { tab_id: 9, index: 3 },
            ]
        );
    }

    #[test]
    fn test_end_to_end_order() {
        // A(other), B(300s), C(unknown), D(120s)
        let host = MockHost::new(vec![
            other_tab(1, "https://example.com"),
            watch_tab(2, "bbb"),
            watch_tab(3, "ccc"),
            watch_tab(4, "ddd"),
        ])
        .reply(2, ProbeReply::Seconds(300.0))
        .reply(3, ProbeReply::Seconds(-1.0))
        .reply(4, ProbeReply::Seconds(120.0));

        let report = block_on(sort_window(&host, &SorterConfig::default())).unwrap();

        assert_eq!(host.window_order(), vec![4, 2, 3, 1]);
        assert_eq!(
            report,
            SortReport {
                targets: 3,
                known: 2,
                unknown: 1,
                moves: 4,
            }
        );
    }

    #[test]
    fn test_no_targets_means_no_moves() {
        let host = MockHost::new(vec![
            other_tab(5, "https://b.com"),
            other_tab(2, "https://a.com"),
            other_tab(9, "https://www.youtube.com/watch"),
        ]);

        let report = block_on(sort_window(&host, &SorterConfig::default())).unwrap();

        assert_eq!(report, SortReport::default());
        assert!(host.moves.borrow().is_empty());
        assert!(host.probed.borrow().is_empty());
        assert_eq!(host.window_order(), vec![5, 2, 9]);
    }

    #[test]
    fn test_other_tabs_keep_relative_order() {
        let host = MockHost::new(vec![
            other_tab(0, "https://z.com"),
            watch_tab(1, "a"),
            other_tab(2, "https://a.com"),
            watch_tab(3, "b"),
            other_tab(4, "https://m.com"),
        ])
        .reply(1, ProbeReply::Seconds(600.0))
        .reply(3, ProbeReply::Seconds(30.0));

        block_on(sort_window(&host, &SorterConfig::default())).unwrap();

        assert_eq!(host.window_order(), vec![3, 1, 0, 2, 4]);
    }

    #[test]
    fn test_probe_failures_degrade_to_unknown() {
        let host = MockHost::new(vec![
            watch_tab(1, "a"),
            watch_tab(2, "b"),
            watch_tab(3, "c"),
            watch_tab(4, "d"),
            watch_tab(5, "e"),
        ])
        .reply(1, ProbeReply::Fail)
        .reply(2, ProbeReply::Seconds(90.0))
        .reply(3, ProbeReply::Raw(Value::Null))
        .reply(4, ProbeReply::Raw(json!("12:00")))
        .reply(5, ProbeReply::Seconds(15.0));

        let report = block_on(sort_window(&host, &SorterConfig::default())).unwrap();

        assert_eq!(host.window_order(), vec![5, 2, 1, 3, 4]);
        assert_eq!(report.known, 2);
        assert_eq!(report.unknown, 3);
        assert_eq!(host.probed.borrow().len(), 5);
    }

    #[test]
    fn test_hung_probe_times_out() {
        let host = MockHost::new(vec![watch_tab(1, "a"), watch_tab(2, "b")])
            .reply(1, ProbeReply::Hang)
            .reply(2, ProbeReply::Seconds(42.0));

        let report = block_on(sort_window(&host, &SorterConfig::default())).unwrap();

        assert_eq!(host.window_order(), vec![2, 1]);
        assert_eq!(report.unknown, 1);
    }

    #[test]
    fn test_enumeration_failure_moves_nothing() {
        let mut host = MockHost::new(vec![]);
        host.query_error = Some(HostError::new("No current window"));

        let result = block_on(sort_window(&host, &SorterConfig::default()));

        assert!(matches!(result, Err(SortError::Enumerate(_))));
        assert!(host.moves.borrow().is_empty());
    }

    #[test]
    fn test_move_failure_stops_remaining_moves() {
        let mut host = MockHost::new(vec![
            other_tab(1, "https://example.com"),
            watch_tab(2, "b"),
            watch_tab(3, "c"),
        ])
        .reply(2, ProbeReply::Seconds(20.0))
        .reply(3, ProbeReply::Seconds(10.0));
        host.fail_move_for = Some(2);

        let result = block_on(sort_window(&host, &SorterConfig::default()));

        match result {
            Err(SortError::Move { tab_id, index, .. }) => {
                assert_eq!(tab_id, 2);
                assert_eq!(index, 1);
            }
            other => panic!("expected move failure, got {:?}", other),
        }
        // Tab 3 already moved, tab 1 never touched
        assert_eq!(*host.moves.borrow(), vec![TabMove { tab_id: 3, index: 0 }]);
        assert_eq!(host.window_order(), vec![3, 1, 2]);
    }

    #[test]
    fn test_sorting_twice_is_idempotent() {
        let host = MockHost::new(vec![
            watch_tab(1, "a"),
            other_tab(2, "https://example.com"),
            watch_tab(3, "b"),
        ])
        .reply(1, ProbeReply::Seconds(500.0))
        .reply(3, ProbeReply::Seconds(50.0));

        block_on(sort_window(&host, &SorterConfig::default())).unwrap();
        let first = host.window_order();
        block_on(sort_window(&host, &SorterConfig::default())).unwrap();

        assert_eq!(first, vec![3, 1, 2]);
        assert_eq!(host.window_order(), first);
    }

    #[test]
    fn test_run_swallows_errors() {
        let mut host = MockHost::new(vec![]);
        host.query_error = Some(HostError::new("boom"));

        assert_eq!(block_on(run(&host, &SorterConfig::default())), None);
        // The guard is released after a failed run
        assert!(RunGuard::acquire().is_some());
    }

    #[test]
    fn test_run_ignores_overlapping_trigger() {
        let host = MockHost::new(vec![watch_tab(1, "a")]).reply(1, ProbeReply::Seconds(5.0));

        let guard = RunGuard::acquire().unwrap();
        assert_eq!(block_on(run(&host, &SorterConfig::default())), None);
        assert!(host.probed.borrow().is_empty());
        drop(guard);

        let report = block_on(run(&host, &SorterConfig::default())).unwrap();
        assert_eq!(report.targets, 1);
    }
}
