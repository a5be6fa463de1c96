//! Chat UI and favicon.

use std::sync::OnceLock;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use base64::Engine;
use bytes::Bytes;

use crate::state::AppState;

/// Bundled chat page. The placeholder base URL is rewritten at startup
/// to the public LLM route.
const CHAT_HTML: &str = include_str!("../../assets/chat.html");

/// Placeholder the front-end build bakes in for local development.
const PLACEHOLDER_BASE_URL: &str = "http://localhost:1234";

/// Default page title, replaced when a custom title is configured.
const DEFAULT_TITLE: &str = "<title>Confidential LLM</title>";

/// 16x16 ICO, base64-encoded.
const FAVICON_BASE64: &str = "\
AAABAAEAEBAAAAEAIABoBAAAFgAAACgAAAAQAAAAIAAAAAEAIAAAAAAAAAAAAAAAAAAAAAAAAAAA\
AAAAAAAwKCj/MCgo/zAoKP8wKCj/MCgo/zAoKP8wKCj/MCgo/zAoKP8wKCj/MCgo/zAoKP8wKCj/\
MCgo/zAoKP8wKCj/MCgo/6BYdP+gYHT/oGh0/6BwdP+geHT/oIB0/6CIdP+gkHT/oJh0/6CgdP+g\
qHT/oLB0/6C4dP+gwHT/MCgo/zAoKP+gWHr/oGB6/6Boev+gcHr/oHh6/6CAev+giHr/oJB6/6CY\
ev+goHr/oKh6/6Cwev+guHr/oMB6/zAoKP8wKCj/oFiA/6BggP+gaID/oHCA/6B4gP+ggID/oIiA\
/6CQgP+gmID/oKCA/6CogP+gsID/oLiA/6DAgP8wKCj/MCgo/6BYhv+gYIb/oGiG/6Bwhv+geIb/\
oICG/6CIhv+gkIb/oJiG/6Cghv+gqIb/oLCG/6C4hv+gwIb/MCgo/zAoKP+gWIz/oGCM/6BojP+g\
cIz/oHiM/6CAjP+giIz/oJCM/6CYjP+goIz/oKiM/6CwjP+guIz/oMCM/zAoKP8wKCj/oFiS/6Bg\
kv+gaJL/oHCS/6B4kv+ggJL/oIiS/6CQkv+gmJL/oKCS/6Cokv+gsJL/oLiS/6DAkv8wKCj/MCgo\
/6BYmP+gYJj/oGiY/6BwmP+geJj/oICY/6CImP+gkJj/oJiY/6CgmP+gqJj/oLCY/6C4mP+gwJj/\
MCgo/zAoKP+gWJ7/oGCe/6Bonv+gcJ7/oHie/6CAnv+giJ7/oJCe/6CYnv+goJ7/oKie/6Cwnv+g\
uJ7/oMCe/zAoKP8wKCj/oFik/6BgpP+gaKT/oHCk/6B4pP+ggKT/oIik/6CQpP+gmKT/oKCk/6Co\
pP+gsKT/oLik/6DApP8wKCj/MCgo/6BYqv+gYKr/oGiq/6Bwqv+geKr/oICq/6CIqv+gkKr/oJiq\
/6Cgqv+gqKr/oLCq/6C4qv+gwKr/MCgo/zAoKP+gWLD/oGCw/6BosP+gcLD/oHiw/6CAsP+giLD/\
oJCw/6CYsP+goLD/oKiw/6CwsP+guLD/oMCw/zAoKP8wKCj/oFi2/6Bgtv+gaLb/oHC2/6B4tv+g\
gLb/oIi2/6CQtv+gmLb/oKC2/6Cotv+gsLb/oLi2/6DAtv8wKCj/MCgo/6BYvP+gYLz/oGi8/6Bw\
vP+geLz/oIC8/6CIvP+gkLz/oJi8/6CgvP+gqLz/oLC8/6C4vP+gwLz/MCgo/zAoKP+gWML/oGDC\
/6Bowv+gcML/oHjC/6CAwv+giML/oJDC/6CYwv+goML/oKjC/6Cwwv+guML/oMDC/zAoKP8wKCj/\
MCgo/zAoKP8wKCj/MCgo/zAoKP8wKCj/MCgo/zAoKP8wKCj/MCgo/zAoKP8wKCj/MCgo/zAoKP8w\
KCj/AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA\
AAAAAAAAAAAAAA==";

/// Render the chat page for a given public LLM route and optional title.
pub fn render_index(public_llm_url: &str, custom_title: Option<&str>) -> String {
    let mut page = CHAT_HTML.replace(PLACEHOLDER_BASE_URL, public_llm_url);
    if let Some(title) = custom_title {
        page = page.replace(
            DEFAULT_TITLE,
            &format!("<title>Confidential LLM: {title}</title>"),
        );
    }
    page
}

/// `GET /` — the chat UI.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.index_html.clone())
}

/// `GET /favicon.ico`
pub async fn favicon() -> Response {
    static DECODED: OnceLock<Option<Bytes>> = OnceLock::new();
    let decoded = DECODED.get_or_init(|| {
        base64::engine::general_purpose::STANDARD
            .decode(FAVICON_BASE64)
            .ok()
            .map(Bytes::from)
    });

    match decoded {
        Some(bytes) => (
            [
                (header::CONTENT_TYPE, "image/x-icon"),
                (header::CACHE_CONTROL, "public, max-age=86400"),
            ],
            bytes.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Favicon not found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_base_url_is_rewritten() {
        let page = render_index("https://edge.acu.run/llm", None);
        assert!(!page.contains(PLACEHOLDER_BASE_URL));
        assert!(page.contains("https://edge.acu.run/llm"));
    }

    #[test]
    fn custom_title_is_applied() {
        let page = render_index("https://edge.acu.run/llm", Some("Lab Box"));
        assert!(page.contains("<title>Confidential LLM: Lab Box</title>"));

        let page = render_index("https://edge.acu.run/llm", None);
        assert!(page.contains(DEFAULT_TITLE));
    }

    #[test]
    fn favicon_constant_decodes() {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(FAVICON_BASE64)
            .unwrap();
        // ICO magic: reserved 0, type 1.
        assert_eq!(&bytes[..4], &[0, 0, 1, 0]);
    }
}
