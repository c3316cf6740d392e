use std::time::{Duration, Instant};

use mediaboost_core::{
    message::{Request, Response},
    DesiredConfig, ElementId,
};
use mediaboost_dom::{Document, ObserveOptions};
use mediaboost_graph::{AudioBackend, AudioContext, ContextCell, ContextConfig};

use crate::{
    reconciler::{ReconcileError, Reconciler},
    registry::Registry,
    session::SessionStore,
    watcher::ElementWatcher,
};

const UNRECOGNIZED_MESSAGE: &str = "Unrecognized message";
const ENGINE_UNAVAILABLE: &str = "Audio engine unavailable";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManagerConfig {
    /// How long after a page load the session configuration is replayed.
    ///
    /// By default this is set to 500 ms.
    pub replay_delay: Duration,
    pub context: ContextConfig,
    pub observe: ObserveOptions,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            replay_delay: Duration::from_millis(500),
            context: ContextConfig::default(),
            observe: ObserveOptions::default(),
        }
    }
}

/// The result of reconciling a batch of elements.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// The number of elements whose chain now matches the configuration.
    pub processed: u32,
    pub failed: u32,
    /// Whether any element failed because no audio context could be opened.
    pub context_unavailable: bool,
}

/// Owns the audio state of a single document.
///
/// Nothing happens on its own. The host forwards messages with
/// [`DocumentAudioManager::handle_request`], and calls
/// [`DocumentAudioManager::process_mutations`] and
/// [`DocumentAudioManager::tick`] regularly.
pub struct DocumentAudioManager<B: AudioBackend> {
    document: Document,
    contexts: ContextCell<B>,
    registry: Registry,
    session: SessionStore,
    watcher: ElementWatcher,
    replay_delay: Duration,
    pending_replay: Option<Instant>,
}

impl<B: AudioBackend> DocumentAudioManager<B> {
    /// Start managing a document.
    ///
    /// `restored` is the session configuration carried over from a previous
    /// load of the page, if any. The audio context is not opened until the
    /// first element needs it.
    pub fn attach(
        mut document: Document,
        backend: B,
        config: ManagerConfig,
        restored: Option<DesiredConfig>,
    ) -> Self {
        let watcher = ElementWatcher::new(config.observe);
        watcher.observe(&mut document);

        Self {
            document,
            contexts: ContextCell::new(backend, config.context),
            registry: Registry::new(),
            session: SessionStore::new(restored),
            watcher,
            replay_delay: config.replay_delay,
            pending_replay: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The audio context, if it has been opened.
    pub fn context(&self) -> Option<&AudioContext> {
        self.contexts.get()
    }

    pub fn contexts_mut(&mut self) -> &mut ContextCell<B> {
        &mut self.contexts
    }

    /// Apply a request from the control surface.
    ///
    /// The configuration is stored in the session before any element is
    /// touched, so it is replayed on the next load even if no element is
    /// present yet.
    pub fn handle_request(&mut self, request: Request) -> Response {
        let Request::SetVolume(set_volume) = request;
        let config = set_volume.desired_config();

        self.session.set(config.clone());
        let report = self.process_all(&config);

        log::debug!(
            "Applied {}% to {} elements ({} failed)",
            config.volume_percent,
            report.processed,
            report.failed
        );

        if report.context_unavailable {
            Response {
                success: false,
                message: ENGINE_UNAVAILABLE.into(),
                elements_processed: report.processed,
            }
        } else {
            Response {
                success: true,
                message: format!("Volume set to {}%", config.volume_percent),
                elements_processed: report.processed,
            }
        }
    }

    /// Apply a JSON request and return the JSON response.
    pub fn handle_message_json(&mut self, json: &str) -> String {
        let response = match Request::from_json(json) {
            Ok(request) => self.handle_request(request),
            Err(e) => {
                log::debug!("Ignoring unrecognized message: {}", e);

                Response {
                    success: false,
                    message: UNRECOGNIZED_MESSAGE.into(),
                    elements_processed: 0,
                }
            }
        };

        serde_json::to_string(&response).unwrap_or_else(|e| {
            log::error!("Failed to serialize response: {}", e);
            format!(
                r#"{{"success":false,"message":"{}","elementsProcessed":0}}"#,
                UNRECOGNIZED_MESSAGE
            )
        })
    }

    /// Reconcile every media element currently in the document.
    pub fn process_all(&mut self, config: &DesiredConfig) -> BatchReport {
        let elements = self.document.media_elements();
        self.reconcile_batch(&elements, config)
    }

    /// Reconcile the media elements inserted since the last call.
    ///
    /// Insertions are ignored while there is no session configuration.
    pub fn process_mutations(&mut self) -> BatchReport {
        let records = self.document.take_records();
        if records.is_empty() {
            return BatchReport::default();
        }

        let Some(config) = self.session.get().cloned() else {
            log::trace!("No session configuration, ignoring {} mutations", records.len());
            return BatchReport::default();
        };

        let elements = self.watcher.collect(&self.document, &records);
        if elements.is_empty() {
            return BatchReport::default();
        }

        log::debug!("Found {} new media elements", elements.len());

        self.reconcile_batch(&elements, &config)
    }

    /// Schedule a replay of the session configuration, if there is one.
    pub fn on_page_load(&mut self, now: Instant) {
        if self.session.get().is_some() {
            self.pending_replay = Some(now + self.replay_delay);
        }
    }

    /// Run the scheduled replay if it is due.
    ///
    /// Returns `None` if nothing was replayed.
    pub fn tick(&mut self, now: Instant) -> Option<BatchReport> {
        let due = self.pending_replay?;
        if now < due {
            return None;
        }
        self.pending_replay = None;

        let config = self.session.get().cloned()?;

        log::debug!("Replaying session configuration: {}%", config.volume_percent);

        Some(self.process_all(&config))
    }

    /// The document is being navigated away from.
    pub fn navigate(&mut self) {
        self.session.clear();
        self.pending_replay = None;
    }

    fn reconcile_batch(&mut self, elements: &[ElementId], config: &DesiredConfig) -> BatchReport {
        let mut report = BatchReport::default();
        let mut reconciler = Reconciler::new(&mut self.contexts, &mut self.registry);

        for (i, element) in elements.iter().enumerate() {
            match reconciler.reconcile(*element, config) {
                Ok(outcome) => {
                    log::trace!("{:?}: {:?}", element, outcome);
                    report.processed += 1;
                }
                Err(ReconcileError::ContextUnavailable) => {
                    // Every remaining element would fail the same way.
                    report.context_unavailable = true;
                    report.failed += (elements.len() - i) as u32;
                    break;
                }
                Err(e @ ReconcileError::AlreadyWrapped(_)) => {
                    log::debug!("Skipping {:?}: {}", element, e);
                    report.failed += 1;
                }
                Err(e) => {
                    log::warn!("Failed to process {:?}: {}", element, e);
                    report.failed += 1;
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use mediaboost_core::message::SetVolume;
    use mediaboost_graph::{nodes::GainNode, ContextInfo, HeadlessBackend};

    use super::*;

    const EQ: [f32; 5] = [6.0, 3.0, -2.0, 3.0, 5.0];

    fn manager_with(restored: Option<DesiredConfig>) -> DocumentAudioManager<HeadlessBackend> {
        DocumentAudioManager::attach(
            Document::new(),
            HeadlessBackend::default(),
            ManagerConfig::default(),
            restored,
        )
    }

    fn add_media(manager: &mut DocumentAudioManager<HeadlessBackend>, tag: &str) -> ElementId {
        let doc = manager.document_mut();
        let element = doc.create_element(tag);
        let body = doc.body();
        doc.append_child(body, element).unwrap();
        element
    }

    fn gain_of<B: AudioBackend>(manager: &DocumentAudioManager<B>, element: ElementId) -> f32 {
        let graph = manager.context().unwrap().graph();
        let chain = manager.registry().get(element).unwrap();
        graph.node::<GainNode>(chain.gain()).unwrap().gain().value()
    }

    fn set_volume(volume: u32) -> Request {
        Request::SetVolume(SetVolume {
            volume,
            equalizer: None,
        })
    }

    #[test]
    fn json_message_end_to_end() {
        let mut manager = manager_with(None);
        let video = add_media(&mut manager, "video");
        let audio = add_media(&mut manager, "audio");

        let reply = manager.handle_message_json(
            r#"{"action":"setVolume","volume":150,"equalizer":{"enabled":true,"values":[6,3,-2,3,5]}}"#,
        );
        assert_eq!(
            reply,
            r#"{"success":true,"message":"Volume set to 150%","elementsProcessed":2}"#
        );

        for element in [video, audio] {
            assert_eq!(gain_of(&manager, element), 1.5);
            let chain = manager.registry().get(element).unwrap();
            let gains = chain
                .equalizer()
                .and_then(|bank| bank.gains(manager.context().unwrap().graph()));
            assert_eq!(gains, Some(EQ));
        }

        assert_eq!(
            manager.session().get(),
            Some(&DesiredConfig::new(150).with_equalizer(&EQ))
        );
    }

    #[test]
    fn zero_elements_still_succeeds_and_is_stored() {
        let mut manager = manager_with(None);

        let response = manager.handle_request(set_volume(300));
        assert_eq!(
            response,
            Response {
                success: true,
                message: "Volume set to 300%".into(),
                elements_processed: 0,
            }
        );
        assert_eq!(manager.session().get(), Some(&DesiredConfig::new(300)));
        // Nothing needed a context yet.
        assert!(manager.context().is_none());
    }

    #[test]
    fn pre_wrapped_element_does_not_stop_the_batch() {
        let mut manager = manager_with(None);
        let elements = [
            add_media(&mut manager, "video"),
            add_media(&mut manager, "video"),
            add_media(&mut manager, "audio"),
        ];

        let cx = manager.contexts_mut().get_or_create().unwrap();
        cx.graph_mut()
            .create_media_element_source(elements[1])
            .unwrap();

        let report = manager.process_all(&DesiredConfig::new(200));
        assert_eq!(
            report,
            BatchReport {
                processed: 2,
                failed: 1,
                context_unavailable: false,
            }
        );
        assert!(!manager.registry().contains(elements[1]));
        assert_eq!(gain_of(&manager, elements[0]), 2.0);
        assert_eq!(gain_of(&manager, elements[2]), 2.0);

        let response = manager.handle_request(set_volume(120));
        assert!(response.success);
        assert_eq!(response.elements_processed, 2);
    }

    #[test]
    fn unrecognized_messages() {
        let mut manager = manager_with(None);
        add_media(&mut manager, "video");

        let expected = r#"{"success":false,"message":"Unrecognized message","elementsProcessed":0}"#;
        for message in [
            "not json",
            r#"{"action":"mute"}"#,
            r#"{"action":"setVolume"}"#,
        ] {
            assert_eq!(manager.handle_message_json(message), expected);
        }

        assert!(manager.session().get().is_none());
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn unavailable_engine_is_reported() {
        #[derive(Debug, thiserror::Error)]
        #[error("no audio device")]
        struct NoDevice;

        #[derive(Default)]
        struct FlakyBackend {
            available: bool,
        }

        impl AudioBackend for FlakyBackend {
            type Error = NoDevice;

            fn open(&mut self, config: &ContextConfig) -> Result<ContextInfo, Self::Error> {
                if !self.available {
                    return Err(NoDevice);
                }
                HeadlessBackend::default()
                    .open(config)
                    .map_err(|never| match never {})
            }
        }

        let mut doc = Document::new();
        let body = doc.body();
        for _ in 0..2 {
            let video = doc.create_element("video");
            doc.append_child(body, video).unwrap();
        }

        let mut manager = DocumentAudioManager::attach(
            doc,
            FlakyBackend::default(),
            ManagerConfig::default(),
            None,
        );

        let response = manager.handle_request(set_volume(150));
        assert_eq!(
            response,
            Response {
                success: false,
                message: "Audio engine unavailable".into(),
                elements_processed: 0,
            }
        );
        // The configuration is kept for later.
        assert_eq!(manager.session().get(), Some(&DesiredConfig::new(150)));
        assert!(manager.registry().is_empty());

        // The next attempt opens the context again.
        manager.contexts_mut().backend_mut().available = true;
        let response = manager.handle_request(set_volume(150));
        assert!(response.success);
        assert_eq!(response.elements_processed, 2);
    }

    #[test]
    fn late_nested_element_gets_session_config() {
        let mut manager = manager_with(None);
        manager.handle_request(Request::SetVolume(SetVolume {
            volume: 80,
            equalizer: None,
        }));

        let doc = manager.document_mut();
        let player = doc.create_element("div");
        let frame = doc.create_element("div");
        let video = doc.create_element("video");
        let caption = doc.create_text("live");
        doc.append_child(frame, video).unwrap();
        doc.append_child(player, frame).unwrap();
        doc.append_child(player, caption).unwrap();
        let body = doc.body();
        doc.append_child(body, player).unwrap();

        let report = manager.process_mutations();
        assert_eq!(report.processed, 1);
        assert_eq!(gain_of(&manager, video), 0.8);

        // Already drained.
        assert_eq!(manager.process_mutations(), BatchReport::default());
    }

    #[test]
    fn insertions_without_session_are_ignored() {
        let mut manager = manager_with(None);
        add_media(&mut manager, "audio");

        assert_eq!(manager.process_mutations(), BatchReport::default());
        assert!(manager.registry().is_empty());
        assert!(!manager.document().has_pending_records());
    }

    #[test]
    fn replay_waits_for_the_delay() {
        let mut manager = manager_with(Some(DesiredConfig::new(175)));
        let video = add_media(&mut manager, "video");
        // Elements present at load are picked up by the replay.
        manager.document_mut().take_records();

        let t0 = Instant::now();
        manager.on_page_load(t0);

        assert_eq!(manager.tick(t0), None);
        assert_eq!(manager.tick(t0 + Duration::from_millis(499)), None);
        assert!(manager.registry().is_empty());

        let report = manager.tick(t0 + Duration::from_millis(500)).unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(gain_of(&manager, video), 1.75);

        // Only replayed once.
        assert_eq!(manager.tick(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn no_replay_without_session() {
        let mut manager = manager_with(None);
        add_media(&mut manager, "video");

        let t0 = Instant::now();
        manager.on_page_load(t0);
        assert_eq!(manager.tick(t0 + Duration::from_secs(1)), None);
        assert!(manager.context().is_none());
    }

    #[test]
    fn navigation_clears_session_and_replay() {
        let mut manager = manager_with(Some(DesiredConfig::new(250)));
        add_media(&mut manager, "video");

        let t0 = Instant::now();
        manager.on_page_load(t0);
        manager.navigate();

        assert!(manager.session().get().is_none());
        assert_eq!(manager.tick(t0 + Duration::from_secs(1)), None);

        // New insertions are no longer boosted.
        add_media(&mut manager, "audio");
        assert_eq!(manager.process_mutations(), BatchReport::default());
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn session_survives_reload() {
        let mut first = manager_with(None);
        add_media(&mut first, "video");
        first.handle_message_json(
            r#"{"action":"setVolume","volume":60,"equalizer":{"enabled":true,"values":[1,2]}}"#,
        );
        let saved = first.session().to_json().unwrap();

        let restored = SessionStore::from_json(&saved).unwrap();
        let mut second = manager_with(restored.get().cloned());
        let video = add_media(&mut second, "video");

        let t0 = Instant::now();
        second.on_page_load(t0);
        let report = second.tick(t0 + Duration::from_millis(500)).unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(gain_of(&second, video), 0.6);
        let chain = second.registry().get(video).unwrap();
        let gains = chain
            .equalizer()
            .and_then(|bank| bank.gains(second.context().unwrap().graph()));
        assert_eq!(gains, Some([1.0, 2.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn removed_element_keeps_its_chain() {
        let mut manager = manager_with(None);
        let video = add_media(&mut manager, "video");
        manager.handle_request(set_volume(150));

        manager.document_mut().remove(video).unwrap();
        let response = manager.handle_request(set_volume(90));
        assert!(response.success);
        assert_eq!(response.elements_processed, 0);
        assert!(manager.registry().contains(video));
        assert_eq!(gain_of(&manager, video), 1.5);

        // Inserted again: the existing chain is updated, not rebuilt.
        let chain = *manager.registry().get(video).unwrap();
        let body = manager.document().body();
        manager.document_mut().append_child(body, video).unwrap();
        assert_eq!(manager.process_mutations().processed, 1);
        assert_eq!(manager.registry().get(video), Some(&chain));
        assert_eq!(gain_of(&manager, video), 0.9);
    }
}
