/*!
 * Playlist Tracker
 * ================
 *
 * Keeps the structural view of the most recently fetched master (variant index)
 * playlist and decides whether a manifest request is a switch between quality tracks.
 *
 * Snapshot lifecycle:
 *   - Every manifest body the relay fetches is offered to `observe_manifest`.
 *   - A body that parses as a master playlist replaces the snapshot wholesale and
 *     resets switch detection; media playlists and unparseable text leave it as is.
 *   - Variant URIs are resolved against the directory of the master playlist URL
 *     so membership is always compared on absolute URLs.
 *
 * Switch detection:
 *   - Only requests for a variant URI of the current snapshot take part.
 *   - The first variant request after a snapshot is installed is the baseline.
 *   - A later variant request is a switch when it names a different variant than
 *     the previous one. Re-polling the same variant (live playlists) is not a switch.
 *
 * State is owned by one tracker instance per relay session and guarded by a mutex;
 * no lock is held across an await point.
 */

use m3u8_rs::Playlist;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};
use url::Url;

use crate::utils::url::UrlUtils;

/// Structural view of the last master playlist seen by the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterManifestSnapshot {
    base: Url,
    variants: BTreeSet<String>,
}

impl MasterManifestSnapshot {
    /// Build a snapshot from variant references as written in the playlist
    pub fn new<'a>(manifest_url: &Url, references: impl IntoIterator<Item = &'a str>) -> Self {
        let base = UrlUtils::directory_of(manifest_url);
        let variants = references
            .into_iter()
            .filter_map(|reference| match UrlUtils::join(&base, reference.trim()) {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    debug!(reference, error = %e, "Skipping unresolvable variant reference");
                    None
                }
            })
            .collect();

        Self { base, variants }
    }

    /// Directory the variant references were resolved against
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute variant playlist URLs, sorted
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.variants.contains(url.as_str())
    }
}

/// Parse `body` and return a snapshot if it is a master playlist
pub fn parse_master(manifest_url: &Url, body: &str) -> Option<MasterManifestSnapshot> {
    match m3u8_rs::parse_playlist_res(body.as_bytes()) {
        Ok(Playlist::MasterPlaylist(master)) => {
            let snapshot = MasterManifestSnapshot::new(
                manifest_url,
                master
                    .variants
                    .iter()
                    .filter(|variant| !variant.is_i_frame)
                    .map(|variant| variant.uri.as_str()),
            );
            Some(snapshot)
        }
        Ok(Playlist::MediaPlaylist(_)) => None,
        Err(_) => {
            trace!(url = %manifest_url, "Manifest body did not parse as a playlist");
            None
        }
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    snapshot: Option<MasterManifestSnapshot>,
    /// Variant requested most recently under the current snapshot; `None` until
    /// the baseline request has been observed
    last_variant: Option<String>,
}

/// Session state for master playlist tracking and switch detection
#[derive(Debug, Default)]
pub struct PlaylistTracker {
    state: Mutex<TrackerState>,
}

impl PlaylistTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offer a fetched manifest body to the tracker.
    ///
    /// Returns `true` when the body was a master playlist and replaced the snapshot.
    pub fn observe_manifest(&self, manifest_url: &Url, body: &str) -> bool {
        let Some(snapshot) = parse_master(manifest_url, body) else {
            return false;
        };

        debug!(
            url = %UrlUtils::obfuscate_credentials(manifest_url.as_str()),
            variants = snapshot.len(),
            "Installed master playlist snapshot"
        );

        let mut state = self.lock();
        state.snapshot = Some(snapshot);
        state.last_variant = None;
        true
    }

    /// Decide whether a request for `url` switches quality track.
    ///
    /// Must be evaluated before the same request's body is offered to
    /// [`observe_manifest`](Self::observe_manifest).
    pub fn detect_switch(&self, url: &Url) -> bool {
        let mut state = self.lock();

        let is_member = match state.snapshot.as_ref() {
            Some(snapshot) => snapshot.contains(url),
            None => return false,
        };
        if !is_member {
            return false;
        }

        match state.last_variant.replace(url.to_string()) {
            Some(previous) => previous != url.as_str(),
            None => false,
        }
    }

    /// Copy of the current snapshot, if any
    pub fn snapshot(&self) -> Option<MasterManifestSnapshot> {
        self.lock().snapshot.clone()
    }

    /// Whether the baseline variant request has been observed for the current snapshot
    pub fn first_variant_seen(&self) -> bool {
        self.lock().last_variant.is_some()
    }
}
