/*!
 * Manifest Rewriter
 * =================
 *
 * Points absolute URLs in a manifest body at the relay instead of the origin.
 *
 * Rules (per line, no state carried between lines):
 *   - A line whose content starts with `http://` or `https://` is a resource reference.
 *     Scheme and authority are replaced by `http://{host}:{port}`; the path and
 *     everything after it (query, fragment) are kept as written.
 *   - Every other line (tags, comments, relative URIs, blank lines) is copied verbatim.
 *   - Line terminators (`\n` or `\r\n`) and a missing final newline are preserved.
 *
 * Rewriting is textual only. It does not require the body to parse as a playlist.
 */

const ABSOLUTE_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Rewrite absolute URL lines in `body` to point at `relay_host:relay_port`.
pub fn rewrite(body: &str, relay_host: &str, relay_port: u16) -> String {
    let authority = format!("http://{relay_host}:{relay_port}");
    let mut out = String::with_capacity(body.len());

    for raw_line in body.split_inclusive('\n') {
        let (content, terminator) = split_terminator(raw_line);
        match rewrite_line(content, &authority) {
            Some(rewritten) => out.push_str(&rewritten),
            None => out.push_str(content),
        }
        out.push_str(terminator);
    }

    out
}

/// Split a line into its content and its `\n` / `\r\n` terminator
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, &line[content.len()..])
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, &line[content.len()..])
    } else {
        (line, "")
    }
}

fn rewrite_line(line: &str, authority: &str) -> Option<String> {
    let rest = ABSOLUTE_SCHEMES
        .iter()
        .find_map(|scheme| line.strip_prefix(scheme))?;

    // Authority ends at the first path, query or fragment delimiter
    let tail = rest
        .find(['/', '?', '#'])
        .map(|pos| &rest[pos..])
        .unwrap_or("");

    Some(format!("{authority}{tail}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_absolute_lines_only() {
        let body = "#EXTM3U
#EXT-X-VERSION:3
#EXTINF:2.0,
http://test.com/media-1.ts
#EXTINF:2.0,
https://test.com/media-1.ts
";
        let expected = "#EXTM3U
#EXT-X-VERSION:3
#EXTINF:2.0,
http://localhost:8080/media-1.ts
#EXTINF:2.0,
http://localhost:8080/media-1.ts
";
        assert_eq!(rewrite(body, "localhost", 8080), expected);
    }

    #[test]
    fn test_relative_body_is_unchanged() {
        let body = "#EXTM3U
#EXT-X-VERSION:3
#EXTINF:2.0,
media-1.ts

#EXTINF:2.0,
/abs/media-2.ts
";
        assert_eq!(rewrite(body, "relay.local", 9000), body);
    }

    #[test]
    fn test_keeps_path_query_and_fragment() {
        assert_eq!(
            rewrite(
                "https://user:pw@origin.example:8443/a/b/seg.ts?token=x&n=1#t=2\n",
                "relay",
                80
            ),
            "http://relay:80/a/b/seg.ts?token=x&n=1#t=2\n"
        );
        assert_eq!(
            rewrite("http://origin.example?x=1", "relay", 80),
            "http://relay:80?x=1"
        );
    }

    #[test]
    fn test_scheme_without_path_gets_empty_path() {
        assert_eq!(rewrite("http://origin.example\n", "relay", 8080), "http://relay:8080\n");
        assert_eq!(rewrite("https://", "relay", 8080), "http://relay:8080");
    }

    #[test]
    fn test_preserves_line_terminators() {
        let body = "#EXTM3U\r\nhttp://origin.example/a.ts\r\nb.ts\r\nhttp://origin.example/c.ts";
        assert_eq!(
            rewrite(body, "relay", 1),
            "#EXTM3U\r\nhttp://relay:1/a.ts\r\nb.ts\r\nhttp://relay:1/c.ts"
        );
    }

    #[test]
    fn test_tags_with_embedded_urls_are_untouched() {
        let body = "#EXT-X-KEY:METHOD=AES-128,URI=\"https://keys.example/k\"\n \
                    http://indented.example/x.ts\n";
        assert_eq!(rewrite(body, "relay", 8080), body);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let relative = "#EXTM3U\n#EXTINF:2.0,\nmedia-1.ts\n";
        let once = rewrite(relative, "relay", 8080);
        assert_eq!(rewrite(&once, "relay", 8080), once);

        let absolute = "#EXTM3U\nhttps://origin.example/media-1.ts\n";
        let once = rewrite(absolute, "relay", 8080);
        assert_eq!(rewrite(&once, "relay", 8080), once);
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(rewrite("", "relay", 8080), "");
    }
}
