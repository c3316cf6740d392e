use std::time::{Duration, Instant};

use mediaboost::{
    badge::Badge,
    dom::Document,
    prefs::{MemoryPreferenceStore, SiteKey, SitePreference, SitePreferenceStore},
    DocumentAudioManager, HeadlessBackend, ManagerConfig,
};

const PAGE_URL: &str = "https://www.example.com:8443/watch?v=demo";
const SESSION_DURATION: Duration = Duration::from_secs(2);
const UPDATE_INTERVAL: Duration = Duration::from_millis(15);

fn main() {
    simple_log::quick!("debug");

    println!("Mediaboost page session...");

    let mut prefs = MemoryPreferenceStore::default();
    let site = SiteKey::from_url(PAGE_URL);

    let mut doc = Document::new();
    let body = doc.body();
    let player = doc.create_element("div");
    let video = doc.create_element("video");
    doc.append_child(player, video).unwrap();
    doc.append_child(body, player).unwrap();

    let mut manager = DocumentAudioManager::attach(
        doc,
        HeadlessBackend::default(),
        ManagerConfig::default(),
        None,
    );

    // The control surface boosts the page.
    let reply = manager.handle_message_json(
        r#"{"action":"setVolume","volume":250,"equalizer":{"enabled":true,"values":[4,2,0,1,3]}}"#,
    );
    println!("reply: {}", reply);

    if let Some(config) = manager.session().get() {
        let badge = Badge::for_volume(config.volume_percent);
        println!("badge: {:?}", badge);

        let pref = SitePreference::from_desired_config(config, Some("custom"));
        if let Err(e) = prefs.save(&site, &pref) {
            log::error!("{}", e);
        }
    }

    // The page is reloaded. The session configuration carries over.
    let saved = match manager.session().to_json() {
        Ok(saved) => saved,
        Err(e) => {
            log::error!("{}", e);
            return;
        }
    };
    let restored = mediaboost::SessionStore::from_json(&saved)
        .ok()
        .and_then(|session| session.get().cloned());

    let mut manager = DocumentAudioManager::attach(
        Document::new(),
        HeadlessBackend::default(),
        ManagerConfig::default(),
        restored,
    );

    let start = Instant::now();
    manager.on_page_load(start);

    let mut inserted = false;
    while start.elapsed() < SESSION_DURATION {
        std::thread::sleep(UPDATE_INTERVAL);

        // A player shows up late.
        if !inserted && start.elapsed() > Duration::from_secs(1) {
            let doc = manager.document_mut();
            let audio = doc.create_element("audio");
            let body = doc.body();
            doc.append_child(body, audio).unwrap();
            inserted = true;
        }

        if let Some(report) = manager.tick(Instant::now()) {
            log::info!("Replayed session: {:?}", report);
        }

        let report = manager.process_mutations();
        if report.processed > 0 || report.failed > 0 {
            log::info!("Processed new elements: {:?}", report);
        }
    }

    match prefs.load(&site) {
        Ok(Some(pref)) => println!("{} -> {:?}", site, pref.to_desired_config()),
        Ok(None) => println!("{} has no saved preference", site),
        Err(e) => log::error!("{}", e),
    }

    println!("finished with {} managed elements", manager.registry().len());
}
