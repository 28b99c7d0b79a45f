//! The application's synchronized state container.

use std::sync::Arc;

use chrono::Utc;
use folio_core::models::analytics::{self, RECENT_LOG_LIMIT};
use folio_core::models::inquiry::{self, Inquiry};
use folio_core::models::{
    feedback, Analytics, ClientWork, Collection, ContactMessage, Feedback, HireRequest, Post,
    Profile, Service, Skill, TrafficSummary,
};
use folio_core::paths;
use folio_core::types::Timestamp;
use folio_store::DocumentStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::collection::{CollectionState, CollectionSync};
use crate::profile::{ProfileState, ProfileSync};

/// Owner of every sync task and the receivers views read from.
///
/// Dropping it cancels the subscriptions; [`shutdown`](Self::shutdown) also
/// waits for the tasks to finish.
pub struct SyncedState {
    profile: watch::Receiver<ProfileState>,
    skills: watch::Receiver<CollectionState<Skill>>,
    services: watch::Receiver<CollectionState<Service>>,
    works: watch::Receiver<CollectionState<ClientWork>>,
    posts: watch::Receiver<CollectionState<Post>>,
    feedback: watch::Receiver<CollectionState<Feedback>>,
    hire_requests: watch::Receiver<CollectionState<HireRequest>>,
    contacts: watch::Receiver<CollectionState<ContactMessage>>,
    analytics: watch::Receiver<CollectionState<Analytics>>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SyncedState {
    /// Subscribe to the profile and every collection and start syncing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(store: &dyn DocumentStore) -> Self {
        let cancel = CancellationToken::new();
        let mut tasks = Vec::new();

        let (profile_sync, profile) = ProfileSync::new();
        let subscription = store.subscribe(profile_sync.path());
        tasks.push(tokio::spawn(profile_sync.run(subscription, cancel.clone())));

        let mut spawner = Spawner {
            store,
            cancel: &cancel,
            tasks: &mut tasks,
        };
        let skills = spawner.collection::<Skill>();
        let services = spawner.collection::<Service>();
        let works = spawner.collection::<ClientWork>();
        let posts = spawner.collection::<Post>();
        let feedback = spawner.collection::<Feedback>();
        let hire_requests = spawner.collection::<HireRequest>();
        let contacts = spawner.collection::<ContactMessage>();
        let analytics = spawner.collection::<Analytics>();

        tracing::info!(subscriptions = tasks.len(), "Synchronization started");

        Self {
            profile,
            skills,
            services,
            works,
            posts,
            feedback,
            hire_requests,
            contacts,
            analytics,
            cancel,
            tasks,
        }
    }

    pub fn profile(&self) -> watch::Receiver<ProfileState> {
        self.profile.clone()
    }

    pub fn skills(&self) -> watch::Receiver<CollectionState<Skill>> {
        self.skills.clone()
    }

    pub fn services(&self) -> watch::Receiver<CollectionState<Service>> {
        self.services.clone()
    }

    pub fn works(&self) -> watch::Receiver<CollectionState<ClientWork>> {
        self.works.clone()
    }

    pub fn posts(&self) -> watch::Receiver<CollectionState<Post>> {
        self.posts.clone()
    }

    pub fn feedback(&self) -> watch::Receiver<CollectionState<Feedback>> {
        self.feedback.clone()
    }

    pub fn hire_requests(&self) -> watch::Receiver<CollectionState<HireRequest>> {
        self.hire_requests.clone()
    }

    pub fn contacts(&self) -> watch::Receiver<CollectionState<ContactMessage>> {
        self.contacts.clone()
    }

    pub fn analytics(&self) -> watch::Receiver<CollectionState<Analytics>> {
        self.analytics.clone()
    }

    /// Point-in-time copy of everything currently published.
    pub fn view(&self) -> StateView {
        let profile = self.profile.borrow();
        let services = self.services.borrow();
        let posts = self.posts.borrow();

        StateView {
            profile: profile.profile.clone(),
            skills: Arc::clone(&self.skills.borrow().items),
            services: Arc::clone(&services.items),
            works: Arc::clone(&self.works.borrow().items),
            posts: Arc::clone(&posts.items),
            feedback: Arc::clone(&self.feedback.borrow().items),
            hire_requests: Arc::clone(&self.hire_requests.borrow().items),
            contacts: Arc::clone(&self.contacts.borrow().items),
            analytics: Arc::clone(&self.analytics.borrow().items),
            profile_loading: profile.loading,
            services_loading: services.loading,
            posts_loading: posts.loading,
        }
    }

    /// True once the profile and every collection have published once.
    pub fn is_loaded(&self) -> bool {
        !self.profile.borrow().loading
            && self.skills.borrow().is_loaded()
            && self.services.borrow().is_loaded()
            && self.works.borrow().is_loaded()
            && self.posts.borrow().is_loaded()
            && self.feedback.borrow().is_loaded()
            && self.hire_requests.borrow().is_loaded()
            && self.contacts.borrow().is_loaded()
            && self.analytics.borrow().is_loaded()
    }

    /// Wait until [`is_loaded`](Self::is_loaded) holds.
    pub async fn wait_until_loaded(&self) {
        let _ = self.profile().wait_for(|s| !s.loading).await;
        wait_loaded(self.skills()).await;
        wait_loaded(self.services()).await;
        wait_loaded(self.works()).await;
        wait_loaded(self.posts()).await;
        wait_loaded(self.feedback()).await;
        wait_loaded(self.hire_requests()).await;
        wait_loaded(self.contacts()).await;
        wait_loaded(self.analytics()).await;
    }

    /// Cancel every subscription and wait for the sync tasks to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Sync task panicked");
            }
        }
        tracing::info!("Synchronization stopped");
    }
}

impl Drop for SyncedState {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn wait_loaded<T>(mut receiver: watch::Receiver<CollectionState<T>>) {
    let _ = receiver.wait_for(CollectionState::is_loaded).await;
}

struct Spawner<'a> {
    store: &'a dyn DocumentStore,
    cancel: &'a CancellationToken,
    tasks: &'a mut Vec<JoinHandle<()>>,
}

impl Spawner<'_> {
    fn collection<T: Collection>(&mut self) -> watch::Receiver<CollectionState<T>> {
        let (sync, receiver) = CollectionSync::<T>::new(paths::top_level(T::PATH));
        let subscription = self.store.subscribe(sync.path());
        self.tasks
            .push(tokio::spawn(sync.run(subscription, self.cancel.clone())));
        receiver
    }
}

/// Read-only snapshot of the synchronized state, with the derived views the
/// pages and the console show.
#[derive(Debug, Clone, Default)]
pub struct StateView {
    pub profile: Option<Arc<Profile>>,
    pub skills: Arc<Vec<Skill>>,
    pub services: Arc<Vec<Service>>,
    pub works: Arc<Vec<ClientWork>>,
    pub posts: Arc<Vec<Post>>,
    pub feedback: Arc<Vec<Feedback>>,
    pub hire_requests: Arc<Vec<HireRequest>>,
    pub contacts: Arc<Vec<ContactMessage>>,
    pub analytics: Arc<Vec<Analytics>>,
    pub profile_loading: bool,
    pub services_loading: bool,
    pub posts_loading: bool,
}

impl StateView {
    /// Feedback cleared for public display.
    pub fn approved_feedback(&self) -> Vec<&Feedback> {
        feedback::approved(&self.feedback)
    }

    /// Hire requests and contact messages, newest first.
    pub fn inbox(&self) -> Vec<Inquiry> {
        inquiry::inbox(&self.hire_requests, &self.contacts)
    }

    /// Total hire requests plus contact messages.
    pub fn outreach_count(&self) -> usize {
        self.hire_requests.len() + self.contacts.len()
    }

    pub fn traffic(&self) -> TrafficSummary {
        self.traffic_at(Utc::now())
    }

    pub fn traffic_at(&self, now: Timestamp) -> TrafficSummary {
        TrafficSummary::compute(&self.analytics, now)
    }

    /// The visitor log shown in the console.
    pub fn recent_visits(&self) -> Vec<&Analytics> {
        analytics::recent(&self.analytics, RECENT_LOG_LIMIT)
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn post(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }
}
