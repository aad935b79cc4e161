mod handler;
mod model;

pub use handler::{
    add_tracks, connect, create_playlist, disconnect, get_playback, get_playlists, get_profile,
    oauth_callback, status, transport_control,
};
