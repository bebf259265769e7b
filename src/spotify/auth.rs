use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{
    config, error,
    management::TokenManager,
    server::start_api_server,
    success,
    types::{PkceToken, Token},
    utils, warning,
};

/// Runs the complete OAuth 2.0 PKCE authentication flow with Spotify.
///
/// Generates the code verifier/challenge pair, starts the local callback
/// server, opens the authorization URL in the user's browser, waits for the
/// callback to complete the token exchange, and persists the token for the
/// daemon to use. PKCE needs no client secret, so nothing sensitive is ever
/// stored beyond the token itself.
pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    // generate PKCE verifier and challenge
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    // start API server
    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    // Construct the authorization URL
    let auth_url = format!(
        "{spotify_auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&scope={scope}",
        spotify_auth_url = &config::spotify_apiauth_url(),
        client_id = &config::spotify_client_id(),
        redirect_uri = &config::spotify_redirect_uri(),
        code_challenge = code_challenge,
        scope = &config::spotify_scope()
    );

    // Store verifier in shared state before redirect
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier: code_verifier.clone(),
            token: None,
        });
    }

    // Open the authorization URL in the default browser
    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    // wait for callback to be hit
    let token = wait_for_token(shared_state).await;

    match token {
        Some(t) => {
            // initialize token manager with token
            let token_manager = TokenManager::new(t.clone());
            if let Err(e) = token_manager.persist().await {
                error!("Failed to save token to cache: {}", e);
            }

            success!("Authentication successful!");
        }
        None => {
            error!("Authentication failed or timed out.");
        }
    }
}

/// Polls the shared state for a completed token, giving the user 60 seconds
/// to finish the browser flow.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    for _ in 0..60 {
        {
            let lock = shared_state.lock().await;
            if let Some(pkce) = lock.as_ref() {
                if let Some(token) = pkce.token.as_ref() {
                    return Some(token.clone());
                }
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}
