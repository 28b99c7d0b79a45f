use std::future::Future;
use std::sync::Arc;

use folio_auth::{AuthGate, AuthState, FirebaseAuth, IdentityProvider, MemoryIdentity};
use folio_store::{DocumentStore, MemoryStore, RestStore};
use folio_sync::{StateView, SyncedState};
use folio_tracker::VisitorTracker;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::error::StartupError;
use crate::mutations::Mutations;
use crate::notice::{Notice, Notifier};

/// Route the application starts on.
const INITIAL_ROUTE: &str = "/";

/// The running application: synchronized state, the mutation layer, the
/// admin gate and the visitor tracker over one document store.
pub struct App {
    identity: Arc<dyn IdentityProvider>,
    state: SyncedState,
    mutations: Mutations,
    notices: mpsc::UnboundedReceiver<Notice>,
    routes: watch::Sender<String>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl App {
    /// Build the application from configuration.
    ///
    /// Falls back to in-memory backends for anything not configured. When
    /// admin credentials are configured they are used to sign in before
    /// synchronization starts; a failed sign-in is logged and the app runs
    /// as a visitor.
    pub async fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let cancel = CancellationToken::new();
        let mut tasks = Vec::new();

        let rest = config.database_url.as_deref().map(RestStore::new);
        let store: Arc<dyn DocumentStore> = match &rest {
            Some(rest) => {
                tracing::info!(url = %rest.database_url(), "Using realtime database");
                Arc::new(rest.clone())
            }
            None => {
                tracing::warn!("FIREBASE_DATABASE_URL not set, using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        let identity: Arc<dyn IdentityProvider> = match &config.api_key {
            Some(api_key) => {
                let auth = FirebaseAuth::new(api_key.clone());
                tasks.push(auth.spawn_token_refresh(cancel.clone()));
                Arc::new(auth)
            }
            None => {
                tracing::warn!("FIREBASE_API_KEY not set, using in-memory identity");
                let mut identity = MemoryIdentity::new();
                if let Some((email, password)) = config.admin_credentials() {
                    identity = identity.with_account(email, password);
                }
                Arc::new(identity)
            }
        };

        if let Some((email, password)) = config.admin_credentials() {
            match identity.sign_in_with_email_and_password(email, password).await {
                Ok(session) => tracing::info!(uid = %session.uid, "Signed in as admin"),
                Err(e) => tracing::warn!(error = %e, "Startup sign-in failed, continuing as visitor"),
            }
        }

        if let Some(rest) = rest {
            let auth = identity.on_auth_state_changed();
            rest.set_auth_token(auth.borrow().id_token().map(str::to_string));
            tasks.push(tokio::spawn(forward_tokens(rest, auth, cancel.clone())));
        }

        let tracker = VisitorTracker::from_config(Arc::clone(&store), &config.tracker)?;
        Ok(Self::assemble(store, identity, tracker, cancel, tasks))
    }

    /// Build the application over explicit backends.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        tracker: VisitorTracker,
    ) -> Self {
        Self::assemble(store, identity, tracker, CancellationToken::new(), Vec::new())
    }

    fn assemble(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        tracker: VisitorTracker,
        cancel: CancellationToken,
        mut tasks: Vec<JoinHandle<()>>,
    ) -> Self {
        let state = SyncedState::start(store.as_ref());

        let (routes, route_rx) = watch::channel(INITIAL_ROUTE.to_string());
        tasks.push(tokio::spawn(tracker.run(route_rx, cancel.clone())));

        let (notifier, notices) = Notifier::channel();
        let mutations = Mutations::new(store, notifier);

        tracing::info!("Application started");
        Self {
            identity,
            state,
            mutations,
            notices,
            routes,
            cancel,
            tasks,
        }
    }

    pub fn state(&self) -> &SyncedState {
        &self.state
    }

    /// Snapshot of everything synchronized so far.
    pub fn view(&self) -> StateView {
        self.state.view()
    }

    pub fn mutations(&self) -> &Mutations {
        &self.mutations
    }

    /// A gate over the shared identity provider for the admin area.
    pub fn gate(&self) -> AuthGate {
        AuthGate::new(Arc::clone(&self.identity))
    }

    /// Publish a route change to the visitor tracker.
    pub fn navigate(&self, path: impl Into<String>) {
        self.routes.send_replace(path.into());
    }

    /// Drain the notices emitted since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        let mut taken = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            taken.push(notice);
        }
        taken
    }

    /// Run until `shutdown` resolves, then stop.
    ///
    /// The loaded-state summary is logged once every collection has
    /// loaded. A store that never answers does not hold up `shutdown`.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let loaded = tokio::select! {
            () = self.state.wait_until_loaded() => true,
            () = &mut shutdown => false,
        };

        if loaded {
            self.log_loaded();
            shutdown.await;
        } else {
            tracing::warn!("Stopping before initial state finished loading");
        }
        self.shutdown().await;
    }

    fn log_loaded(&self) {
        let view = self.view();
        tracing::info!(
            skills = view.skills.len(),
            services = view.services.len(),
            works = view.works.len(),
            posts = view.posts.len(),
            feedback = view.feedback.len(),
            inquiries = view.outreach_count(),
            visits = view.analytics.len(),
            "Initial state loaded"
        );
    }

    /// Stop synchronization, token handling and route tracking.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.state.shutdown().await;
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Background task panicked");
            }
        }
        tracing::info!("Application stopped");
    }
}

/// Keep the store's auth token in step with the signed-in session.
///
/// Open streams keep the token they connected with until they reconnect.
async fn forward_tokens(
    store: RestStore,
    mut auth: watch::Receiver<AuthState>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = auth.changed() => {
                if changed.is_err() {
                    break;
                }
                let token = auth.borrow_and_update().id_token().map(str::to_string);
                tracing::debug!(authenticated = token.is_some(), "Store auth token updated");
                store.set_auth_token(token);
            }
        }
    }
}
