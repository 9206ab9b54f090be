use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use wardflow_core::{
    click_first, dismiss_modal, fill_field, precondition_met, resolve, wait_for, AbsencePolicy,
    Candidate, ClickFallback, ElementHandle, FlowError, Locator, Pacing, ResolveError, Session,
    SessionError, StepOutcome, Strategy, Visibility,
};

#[derive(Debug, Default)]
struct MockElement {
    selectors: Vec<String>,
    text: String,
    aria: Option<String>,
    visible: bool,
    value: String,
    clicks: usize,
}

impl MockElement {
    fn new(selectors: &[&str]) -> Self {
        Self {
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            visible: true,
            ..Default::default()
        }
    }

    fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }
}

/// Fake document standing in for the live page.
#[derive(Debug, Default)]
struct MockSession {
    elements: Vec<MockElement>,
    /// Patterns whose evaluation errors instead of returning zero matches.
    poison: Vec<String>,
    /// Element index -> number of pauses before it becomes visible.
    reveal_after: HashMap<usize, usize>,
    query_count: usize,
    pause_count: usize,
    enter_presses: usize,
    append_count: usize,
    navigations: Vec<String>,
}

impl MockSession {
    fn element(&self, handle: ElementHandle) -> Result<&MockElement, SessionError> {
        self.elements
            .get(handle.0 as usize)
            .ok_or(SessionError::ElementStale { id: handle.0 })
    }

    fn element_mut(&mut self, handle: ElementHandle) -> Result<&mut MockElement, SessionError> {
        self.elements
            .get_mut(handle.0 as usize)
            .ok_or(SessionError::ElementStale { id: handle.0 })
    }

    fn matches(element: &MockElement, candidate: &Candidate) -> bool {
        match candidate.strategy {
            Strategy::Css | Strategy::XPath => element.selectors.contains(&candidate.pattern),
            Strategy::TextExact => element.text == candidate.pattern,
            Strategy::TextContains => element.text.contains(&candidate.pattern),
            Strategy::AriaLabel => element.aria.as_deref() == Some(candidate.pattern.as_str()),
        }
    }

    fn total_clicks(&self) -> usize {
        self.elements.iter().map(|e| e.clicks).sum()
    }
}

#[async_trait]
impl Session for MockSession {
    async fn query(&mut self, candidate: &Candidate) -> Result<Vec<ElementHandle>, SessionError> {
        self.query_count += 1;
        if self.poison.contains(&candidate.pattern) {
            return Err(SessionError::SelectorInvalid {
                selector: candidate.pattern.clone(),
            });
        }
        Ok(self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| Self::matches(e, candidate))
            .map(|(i, _)| ElementHandle(i as u32))
            .collect())
    }

    async fn is_visible(&mut self, el: ElementHandle) -> Result<bool, SessionError> {
        let pauses = self.pause_count;
        let revealed = self
            .reveal_after
            .get(&(el.0 as usize))
            .map(|&n| pauses >= n)
            .unwrap_or(true);
        Ok(self.element(el)?.visible && revealed)
    }

    async fn value(&mut self, el: ElementHandle) -> Result<String, SessionError> {
        Ok(self.element(el)?.value.clone())
    }

    async fn text(&mut self, el: ElementHandle) -> Result<String, SessionError> {
        Ok(self.element(el)?.text.clone())
    }

    async fn clear(&mut self, el: ElementHandle) -> Result<(), SessionError> {
        self.element_mut(el)?.value.clear();
        Ok(())
    }

    async fn append_value(&mut self, el: ElementHandle, text: &str) -> Result<(), SessionError> {
        self.append_count += 1;
        self.element_mut(el)?.value.push_str(text);
        Ok(())
    }

    async fn click(&mut self, el: ElementHandle) -> Result<(), SessionError> {
        self.element_mut(el)?.clicks += 1;
        Ok(())
    }

    async fn press_enter(&mut self) -> Result<(), SessionError> {
        self.enter_presses += 1;
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        self.navigations.push(url.to_string());
        Ok(())
    }

    async fn execute_script(&mut self, _script: &str) -> Result<serde_json::Value, SessionError> {
        Ok(serde_json::Value::Null)
    }

    async fn pause(&mut self, _duration: Duration) {
        self.pause_count += 1;
    }
}

fn fast_pacing() -> Pacing {
    Pacing {
        inter_key_delay_ms: 0,
        settle_delay_ms: 0,
        wait_timeout_ms: 200,
        poll_interval_ms: 1,
    }
}

// ============================================================================
// Resolution
// ============================================================================

#[tokio::test]
async fn resolver_skips_invisible_earlier_candidate() {
    // Candidates 1 and 3 both match, but only candidate 3's element is
    // visible: the resolver must return candidate 3's match.
    let mut session = MockSession {
        elements: vec![
            MockElement::new(&["#first"]).hidden(),
            MockElement::new(&["#third"]),
        ],
        ..Default::default()
    };

    let locator = Locator::css("#first").or_css("#second").or_css("#third");
    let handle = resolve(&mut session, &locator, Visibility::Displayed)
        .await
        .unwrap();
    assert_eq!(handle, ElementHandle(1));
}

#[tokio::test]
async fn resolver_returns_first_match_in_document_order() {
    let mut session = MockSession {
        elements: vec![
            MockElement::new(&["button"]).with_text("A"),
            MockElement::new(&["button"]).with_text("B"),
        ],
        ..Default::default()
    };

    let handle = resolve(&mut session, &Locator::css("button"), Visibility::Displayed)
        .await
        .unwrap();
    assert_eq!(handle, ElementHandle(0));
}

#[tokio::test]
async fn resolver_swallows_candidate_evaluation_errors() {
    let mut session = MockSession {
        elements: vec![MockElement::new(&["#ok"])],
        poison: vec!["!!broken".to_string()],
        ..Default::default()
    };

    let locator = Locator::css("!!broken").or_css("#ok");
    let handle = resolve(&mut session, &locator, Visibility::Displayed)
        .await
        .unwrap();
    assert_eq!(handle, ElementHandle(0));
}

#[tokio::test]
async fn resolver_fails_with_full_candidate_list() {
    let mut session = MockSession::default();
    let locator = Locator::css("#a").or_xpath("//b").or_text("C");

    let err = resolve(&mut session, &locator, Visibility::Displayed)
        .await
        .unwrap_err();
    let ResolveError::TargetNotFound { candidates } = err;
    assert_eq!(candidates.len(), 3);
}

#[tokio::test]
async fn empty_locator_fails_without_any_query() {
    let mut session = MockSession {
        elements: vec![MockElement::new(&["#present"])],
        ..Default::default()
    };

    let result = resolve(&mut session, &Locator::default(), Visibility::Displayed).await;
    assert!(result.is_err());
    assert_eq!(session.query_count, 0);
}

#[tokio::test]
async fn present_visibility_accepts_hidden_elements() {
    let mut session = MockSession {
        elements: vec![MockElement::new(&["#hidden"]).hidden()],
        ..Default::default()
    };

    let locator = Locator::css("#hidden");
    assert!(resolve(&mut session, &locator, Visibility::Displayed)
        .await
        .is_err());
    assert!(resolve(&mut session, &locator, Visibility::Present)
        .await
        .is_ok());
}

#[tokio::test]
async fn text_strategies_match_exact_and_partial() {
    let mut session = MockSession {
        elements: vec![MockElement::new(&[]).with_text("Generate Ticket")],
        ..Default::default()
    };

    assert!(resolve(
        &mut session,
        &Locator::text("Generate Ticket"),
        Visibility::Displayed
    )
    .await
    .is_ok());
    assert!(resolve(
        &mut session,
        &Locator::text("Generate"),
        Visibility::Displayed
    )
    .await
    .is_err());
    assert!(resolve(
        &mut session,
        &Locator::text_contains("Generate"),
        Visibility::Displayed
    )
    .await
    .is_ok());
}

// ============================================================================
// Bounded wait
// ============================================================================

#[tokio::test]
async fn wait_for_resolves_once_target_appears() {
    let mut session = MockSession {
        elements: vec![MockElement::new(&["#late"])],
        reveal_after: HashMap::from([(0, 2)]),
        ..Default::default()
    };

    let handle = wait_for(
        &mut session,
        &Locator::css("#late"),
        Visibility::Displayed,
        Duration::from_millis(500),
        Duration::from_millis(1),
    )
    .await
    .unwrap();
    assert_eq!(handle, ElementHandle(0));
    assert!(session.pause_count >= 2);
}

#[tokio::test]
async fn wait_for_returns_not_found_after_deadline() {
    let mut session = MockSession::default();
    let result = wait_for(
        &mut session,
        &Locator::css("#never"),
        Visibility::Displayed,
        Duration::from_millis(20),
        Duration::from_millis(5),
    )
    .await;
    assert!(matches!(result, Err(ResolveError::TargetNotFound { .. })));
}

// ============================================================================
// Typed entry
// ============================================================================

#[tokio::test]
async fn typed_entry_leaves_exact_final_value() {
    let mut session = MockSession {
        elements: vec![MockElement::new(&["[name=\"username\"]"])],
        ..Default::default()
    };

    let outcome = fill_field(
        &mut session,
        &Locator::css("[name=\"username\"]"),
        "abc",
        AbsencePolicy::Required,
        &fast_pacing(),
    )
    .await
    .unwrap();

    assert!(outcome.completed());
    assert_eq!(session.elements[0].value, "abc");
    // One pause per keystroke plus the settle pause.
    assert_eq!(session.pause_count, 4);
}

#[tokio::test]
async fn typed_entry_clears_previous_value() {
    let mut session = MockSession {
        elements: vec![MockElement {
            selectors: vec!["#field".to_string()],
            visible: true,
            value: "stale".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    };

    fill_field(
        &mut session,
        &Locator::css("#field"),
        "fresh",
        AbsencePolicy::Required,
        &fast_pacing(),
    )
    .await
    .unwrap();
    assert_eq!(session.elements[0].value, "fresh");
}

#[tokio::test]
async fn missing_required_field_fails_before_any_keystroke() {
    let mut session = MockSession {
        elements: vec![MockElement::new(&["#other"])],
        ..Default::default()
    };

    let result = fill_field(
        &mut session,
        &Locator::css("#absent"),
        "abc",
        AbsencePolicy::Required,
        &fast_pacing(),
    )
    .await;

    assert!(matches!(result, Err(FlowError::TargetNotFound(_))));
    assert_eq!(session.append_count, 0);
}

#[tokio::test]
async fn skip_if_absent_performs_zero_mutations() {
    let mut session = MockSession::default();

    let outcome = fill_field(
        &mut session,
        &Locator::css("#absent"),
        "abc",
        AbsencePolicy::SkipIfAbsent,
        &fast_pacing(),
    )
    .await
    .unwrap();

    assert!(outcome.skipped());
    assert_eq!(session.append_count, 0);
    assert_eq!(session.total_clicks(), 0);
}

// ============================================================================
// Click with fallback
// ============================================================================

#[tokio::test]
async fn click_first_fires_exactly_one_click() {
    // Both locators match: only the first may receive a click.
    let mut session = MockSession {
        elements: vec![
            MockElement::new(&["[name=\"submit\"]"]),
            MockElement::new(&["button[type='submit']"]),
        ],
        ..Default::default()
    };

    let locators = vec![
        Locator::css("[name=\"submit\"]"),
        Locator::css("button[type='submit']"),
    ];
    let outcome = click_first(&mut session, &locators, ClickFallback::None)
        .await
        .unwrap();

    assert!(outcome.completed());
    assert_eq!(session.total_clicks(), 1);
    assert_eq!(session.elements[0].clicks, 1);
}

#[tokio::test]
async fn click_first_enter_fallback_when_exhausted() {
    let mut session = MockSession::default();
    let locators = vec![Locator::css("#a"), Locator::css("#b")];

    let outcome = click_first(&mut session, &locators, ClickFallback::EnterKey)
        .await
        .unwrap();
    assert!(outcome.completed());
    assert_eq!(session.enter_presses, 1);
    assert_eq!(session.total_clicks(), 0);
}

#[tokio::test]
async fn click_first_without_fallback_reports_all_candidates() {
    let mut session = MockSession::default();
    let locators = vec![Locator::css("#a").or_css("#b"), Locator::xpath("//c")];

    let err = click_first(&mut session, &locators, ClickFallback::None)
        .await
        .unwrap_err();
    match err {
        FlowError::TargetNotFound(ResolveError::TargetNotFound { candidates }) => {
            assert_eq!(candidates.len(), 3)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Precondition-aware step and modal dismissal
// ============================================================================

#[tokio::test]
async fn precondition_met_only_for_visible_marker() {
    let mut session = MockSession {
        elements: vec![
            MockElement::new(&[".dashboard"]),
            MockElement::new(&[".spinner"]).hidden(),
        ],
        ..Default::default()
    };

    assert!(precondition_met(&mut session, &Locator::css(".dashboard")).await);
    assert!(!precondition_met(&mut session, &Locator::css(".spinner")).await);
    assert!(!precondition_met(&mut session, &Locator::css(".absent")).await);
}

#[tokio::test]
async fn inconclusive_precondition_reads_as_unsatisfied() {
    let mut session = MockSession {
        poison: vec!["!!bad".to_string()],
        ..Default::default()
    };
    assert!(!precondition_met(&mut session, &Locator::css("!!bad")).await);
}

#[tokio::test]
async fn dismiss_modal_clicks_first_visible_control() {
    let mut session = MockSession {
        elements: vec![
            MockElement::new(&[".ant-modal-close"]).hidden(),
            MockElement::new(&[".ant-drawer-close"]),
        ],
        ..Default::default()
    };

    let controls = vec![
        Locator::css(".ant-modal-close"),
        Locator::css(".ant-drawer-close"),
    ];
    let outcome = dismiss_modal(&mut session, &controls).await.unwrap();
    assert!(outcome.completed());
    assert_eq!(session.elements[1].clicks, 1);
}

#[tokio::test]
async fn dismiss_modal_skips_when_nothing_open() {
    let mut session = MockSession::default();
    let controls = vec![Locator::css(".ant-modal-close")];
    let outcome = dismiss_modal(&mut session, &controls).await.unwrap();
    assert!(outcome.skipped());
}
