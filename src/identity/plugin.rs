//! Bevy wiring for sign in, sign up and sign out.

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task};
use futures_lite::future;
use std::sync::Arc;

use crate::config::{ConfigLoaded, DiaryConfig};

use super::{AuthError, IdentityProvider, InMemoryIdentityProvider, User};

/// Provider shared with auth tasks
#[derive(Resource, Clone)]
pub struct Identity(pub Arc<dyn IdentityProvider>);

impl Default for Identity {
    fn default() -> Self {
        Self(Arc::new(InMemoryIdentityProvider::default()))
    }
}

#[derive(Resource, Default)]
pub struct AuthState {
    pub user: Option<User>,
    pub last_error: Option<String>,
    /// Requests spawned but not yet polled to completion
    in_flight: usize,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// True while any request is running
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    fn begin_request(&mut self) {
        self.in_flight += 1;
    }

    fn finish_request(&mut self, result: Result<AuthOutcome, AuthError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(AuthOutcome::SignedIn(user)) => {
                info!("Signed in as {}", user.email);
                self.user = Some(user);
                self.last_error = None;
            }
            Ok(AuthOutcome::SignedOut) => {
                info!("Signed out");
                self.user = None;
                self.last_error = None;
            }
            Err(e) => {
                warn!("{}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }
}

/// Run condition: returns true when a user is signed in.
///
/// Usage: `.run_if(is_authenticated)`
pub fn is_authenticated(auth: Res<AuthState>) -> bool {
    auth.is_authenticated()
}

#[derive(Message, Clone)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Message, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
}

#[derive(Message, Clone, Copy)]
pub struct SignOutRequest;

enum AuthOutcome {
    SignedIn(User),
    SignedOut,
}

/// Component for a running auth request
#[derive(Component)]
struct AuthTask(Task<Result<AuthOutcome, AuthError>>);

/// Startup system registering the on-device profile.
///
/// The in-memory provider forgets accounts on exit, so the profile is signed
/// up again with a throwaway password on every launch.
fn sign_up_local_profile(config: Res<DiaryConfig>, mut requests: MessageWriter<SignUpRequest>) {
    requests.write(SignUpRequest {
        email: config.data.local_profile_email.clone(),
        password: uuid::Uuid::new_v4().simple().to_string(),
    });
}

fn handle_auth_requests(
    mut commands: Commands,
    mut sign_in: MessageReader<SignInRequest>,
    mut sign_up: MessageReader<SignUpRequest>,
    mut sign_out: MessageReader<SignOutRequest>,
    identity: Res<Identity>,
    mut auth: ResMut<AuthState>,
) {
    let task_pool = IoTaskPool::get();

    for request in sign_up.read() {
        let provider = identity.0.clone();
        let request = request.clone();
        auth.begin_request();
        commands.spawn(AuthTask(task_pool.spawn(async move {
            provider
                .sign_up(&request.email, &request.password)
                .await
                .map(AuthOutcome::SignedIn)
        })));
    }

    for request in sign_in.read() {
        let provider = identity.0.clone();
        let request = request.clone();
        auth.begin_request();
        commands.spawn(AuthTask(task_pool.spawn(async move {
            provider
                .sign_in(&request.email, &request.password)
                .await
                .map(AuthOutcome::SignedIn)
        })));
    }

    for _ in sign_out.read() {
        let provider = identity.0.clone();
        auth.begin_request();
        commands.spawn(AuthTask(task_pool.spawn(async move {
            provider.sign_out().await.map(|()| AuthOutcome::SignedOut)
        })));
    }
}

/// Polls auth tasks and updates the auth state
fn poll_auth_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut AuthTask)>,
    mut auth: ResMut<AuthState>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            auth.finish_request(result);
            commands.entity(entity).despawn();
        }
    }
}

pub struct AuthPlugin;

impl Plugin for AuthPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Identity>()
            .init_resource::<AuthState>()
            .add_message::<SignInRequest>()
            .add_message::<SignUpRequest>()
            .add_message::<SignOutRequest>()
            .add_systems(Startup, sign_up_local_profile.after(ConfigLoaded))
            .add_systems(Update, (handle_auth_requests, poll_auth_tasks).chain());
    }
}
