use std::collections::HashSet;
use std::io::Read;

use thiserror::Error;
use uuid::Uuid;
use xmltree::{Element, EmitterConfig, XMLNode};

/// Element tags treated as seat markers unless the caller overrides them.
pub const DEFAULT_SEAT_TAGS: [&str; 4] = ["rect", "circle", "path", "ellipse"];

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const SANITIZED_FILL: &str = "white";

/// One seat discovered in an uploaded seating scheme.
///
/// `id` is freshly minted per extraction and written back into the sanitized
/// document, so the rendered scheme and the persisted seat share a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatMarker {
    pub id: Uuid,
    pub row: i32,
    pub column: i32,
}

#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("scheme is not well-formed SVG: {0}")]
    Parse(#[from] xmltree::ParseError),
    #[error("seat element <{tag}> has no id attribute")]
    MissingSeatId { tag: String },
    #[error("seat id {id:?} is not of the form <row>-<column>")]
    BadSeatId { id: String },
    #[error("failed to serialize sanitized scheme: {0}")]
    Serialize(#[from] xmltree::Error),
}

/// Parses an SVG seating scheme, extracts every seat marker, and sanitizes the
/// document for client rendering.
///
/// Every element in the SVG namespace whose tag is in `tags` must carry an id
/// of the form `<row>-<column>` (both plain decimal integers). Each one gets a
/// fresh UUID written into its `id` attribute and its `fill` reset to white;
/// namespace declarations no element uses are stripped, and everything else in
/// the document is left untouched.
///
/// Returns the sanitized document as pretty-printed UTF-8 XML plus the seat
/// markers in discovery order (tag-major, document order within each tag).
/// Any parse or id-format failure aborts the whole call with no output.
pub fn extract_seats<R: Read>(
    scheme: R,
    tags: &[&str],
) -> Result<(Vec<u8>, Vec<SeatMarker>), SchemeError> {
    let mut root = Element::parse(scheme)?;

    let mut seats = Vec::new();
    for tag in tags {
        collect_markers(&mut root, tag, &mut seats)?;
    }

    let mut used_prefixes = HashSet::new();
    collect_used_prefixes(&root, &mut used_prefixes);
    strip_unused_namespaces(&mut root, &used_prefixes);

    let mut buffer = Vec::new();
    root.write_with_config(
        &mut buffer,
        EmitterConfig::new()
            .perform_indent(true)
            .write_document_declaration(true),
    )?;

    Ok((buffer, seats))
}

fn collect_markers(
    parent: &mut Element,
    tag: &str,
    seats: &mut Vec<SeatMarker>,
) -> Result<(), SchemeError> {
    for child in parent.children.iter_mut() {
        let XMLNode::Element(elem) = child else {
            continue;
        };

        if elem.name == tag && elem.namespace.as_deref() == Some(SVG_NS) {
            let id = elem
                .attributes
                .get("id")
                .ok_or_else(|| SchemeError::MissingSeatId {
                    tag: tag.to_string(),
                })?;
            let (row, column) =
                parse_seat_id(id).ok_or_else(|| SchemeError::BadSeatId { id: id.clone() })?;

            let marker = SeatMarker {
                id: Uuid::new_v4(),
                row,
                column,
            };
            elem.attributes.insert("id".to_string(), marker.id.to_string());
            elem.attributes
                .insert("fill".to_string(), SANITIZED_FILL.to_string());
            seats.push(marker);
        }

        collect_markers(elem, tag, seats)?;
    }
    Ok(())
}

fn collect_used_prefixes(elem: &Element, used: &mut HashSet<String>) {
    // xmltree keys attributes by local name, so only element prefixes can
    // reference a declaration. Elements in the default namespace count as "".
    used.insert(elem.prefix.clone().unwrap_or_default());
    for child in &elem.children {
        if let XMLNode::Element(e) = child {
            collect_used_prefixes(e, used);
        }
    }
}

// Drops declarations no element in the document uses; the builtin xml/xmlns
// bindings stay untouched.
fn strip_unused_namespaces(elem: &mut Element, used: &HashSet<String>) {
    if let Some(ns) = elem.namespaces.as_mut() {
        ns.0
            .retain(|prefix, _| prefix == "xml" || prefix == "xmlns" || used.contains(prefix));
    }
    for child in elem.children.iter_mut() {
        if let XMLNode::Element(e) = child {
            strip_unused_namespaces(e, used);
        }
    }
}

// Strict `<digits>-<digits>`; anything looser (signs, spaces, extra dashes)
// is rejected rather than guessed at.
fn parse_seat_id(id: &str) -> Option<(i32, i32)> {
    let (row, column) = id.split_once('-')?;
    if row.is_empty()
        || column.is_empty()
        || !row.bytes().all(|b| b.is_ascii_digit())
        || !column.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some((row.parse().ok()?, column.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn svg(body: &str) -> Vec<u8> {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">{}</svg>"#,
            body
        )
        .into_bytes()
    }

    fn extract(body: &str) -> Result<(Vec<u8>, Vec<SeatMarker>), SchemeError> {
        extract_seats(svg(body).as_slice(), &DEFAULT_SEAT_TAGS)
    }

    fn elements_of<'a>(root: &'a Element, tag: &str, out: &mut Vec<&'a Element>) {
        for child in &root.children {
            if let XMLNode::Element(e) = child {
                if e.name == tag {
                    out.push(e);
                }
                elements_of(e, tag, out);
            }
        }
    }

    #[test]
    fn extracts_rect_and_circle_ignores_line() {
        let (buffer, seats) = extract(
            r#"<rect id="3-5" fill="red"/><circle id="1-2" fill="blue"/><line id="ignored"/>"#,
        )
        .unwrap();

        assert_eq!(seats.len(), 2);
        assert_eq!((seats[0].row, seats[0].column), (3, 5));
        assert_eq!((seats[1].row, seats[1].column), (1, 2));

        let root = Element::parse(buffer.as_slice()).unwrap();

        let mut rects = Vec::new();
        elements_of(&root, "rect", &mut rects);
        assert_eq!(rects[0].attributes["id"], seats[0].id.to_string());
        assert_eq!(rects[0].attributes["fill"], "white");

        let mut circles = Vec::new();
        elements_of(&root, "circle", &mut circles);
        assert_eq!(circles[0].attributes["id"], seats[1].id.to_string());
        assert_eq!(circles[0].attributes["fill"], "white");

        // Unrecognized tag keeps its original attributes and yields no marker.
        let mut lines = Vec::new();
        elements_of(&root, "line", &mut lines);
        assert_eq!(lines[0].attributes["id"], "ignored");
        assert!(!lines[0].attributes.contains_key("fill"));
    }

    #[test]
    fn discovery_order_is_tag_major() {
        let (_, seats) =
            extract(r#"<circle id="1-1"/><rect id="2-1"/><circle id="1-2"/>"#).unwrap();
        // rect is listed before circle in the default tag set.
        let coords: Vec<_> = seats.iter().map(|s| (s.row, s.column)).collect();
        assert_eq!(coords, vec![(2, 1), (1, 1), (1, 2)]);
    }

    #[test]
    fn finds_nested_markers() {
        let (_, seats) = extract(r#"<g><g><rect id="4-7" fill="red"/></g></g>"#).unwrap();
        assert_eq!(seats.len(), 1);
        assert_eq!((seats[0].row, seats[0].column), (4, 7));
    }

    #[test]
    fn elements_outside_svg_namespace_are_ignored() {
        let input = br#"<svg xmlns="http://www.w3.org/2000/svg">
            <rect id="1-1"/>
            <other:rect xmlns:other="http://example.com/ns" id="not-a-seat"/>
        </svg>"#;
        let (_, seats) = extract_seats(&input[..], &DEFAULT_SEAT_TAGS).unwrap();
        assert_eq!(seats.len(), 1);
    }

    #[test]
    fn repeated_extraction_mints_disjoint_ids() {
        let input = svg(r#"<rect id="1-1"/><rect id="1-2"/>"#);
        let (_, first) = extract_seats(input.as_slice(), &DEFAULT_SEAT_TAGS).unwrap();
        let (_, second) = extract_seats(input.as_slice(), &DEFAULT_SEAT_TAGS).unwrap();

        let coords = |s: &[SeatMarker]| {
            let mut v: Vec<_> = s.iter().map(|m| (m.row, m.column)).collect();
            v.sort_unstable();
            v
        };
        assert_eq!(coords(&first), coords(&second));

        let ids: HashSet<Uuid> = first.iter().chain(&second).map(|m| m.id).collect();
        assert_eq!(ids.len(), first.len() + second.len());
    }

    #[test]
    fn custom_tag_set_overrides_default() {
        let input = svg(r#"<rect id="1-1"/><circle id="2-2"/>"#);
        let (_, seats) = extract_seats(input.as_slice(), &["circle"]).unwrap();
        assert_eq!(seats.len(), 1);
        assert_eq!((seats[0].row, seats[0].column), (2, 2));
    }

    #[test]
    fn rejects_malformed_seat_ids() {
        for bad in ["A1", "x-y", "1-", "-2", "1-2-3", " 1-2", "1- 2", "-1-2"] {
            let err = extract(&format!(r#"<rect id="{bad}"/>"#)).unwrap_err();
            assert!(
                matches!(err, SchemeError::BadSeatId { .. }),
                "id {bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn rejects_marker_without_id() {
        let err = extract(r#"<rect fill="red"/>"#).unwrap_err();
        assert!(matches!(err, SchemeError::MissingSeatId { .. }));
    }

    #[test]
    fn failure_on_one_marker_aborts_the_call() {
        let result = extract(r#"<rect id="1-1"/><rect id="oops"/>"#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_xml_input() {
        let err = extract_seats(&b"not xml at all"[..], &DEFAULT_SEAT_TAGS).unwrap_err();
        assert!(matches!(err, SchemeError::Parse(_)));
    }

    #[test]
    fn strips_namespace_declarations_nothing_uses() {
        let input = br#"<svg xmlns="http://www.w3.org/2000/svg"
                             xmlns:sketch="http://example.com/never-used">
            <rect id="1-1" fill="red"/>
        </svg>"#;
        let (buffer, _) = extract_seats(&input[..], &DEFAULT_SEAT_TAGS).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(!text.contains("never-used"));
        assert!(text.contains("http://www.w3.org/2000/svg"));
    }

    #[test]
    fn keeps_namespace_declarations_still_in_use() {
        let input = br#"<svg xmlns="http://www.w3.org/2000/svg"
                             xmlns:ext="http://example.com/ext">
            <rect id="1-1"/>
            <ext:meta/>
        </svg>"#;
        let (buffer, seats) = extract_seats(&input[..], &DEFAULT_SEAT_TAGS).unwrap();
        assert_eq!(seats.len(), 1);
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("http://example.com/ext"));
    }

    #[test]
    fn output_is_declared_utf8_xml() {
        let (buffer, _) = extract(r#"<rect id="1-1"/>"#).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("UTF-8") || text.contains("utf-8"));
    }

    proptest! {
        #[test]
        fn marker_count_and_coords_round_trip(
            coords in proptest::collection::vec((0i32..500, 0i32..500), 0..40)
        ) {
            let body: String = coords
                .iter()
                .map(|(r, c)| format!(r#"<rect id="{r}-{c}"/>"#))
                .collect();
            let (buffer, seats) = extract(&body).unwrap();

            prop_assert_eq!(seats.len(), coords.len());
            for (marker, (r, c)) in seats.iter().zip(&coords) {
                prop_assert_eq!((marker.row, marker.column), (*r, *c));
            }

            let ids: HashSet<Uuid> = seats.iter().map(|m| m.id).collect();
            prop_assert_eq!(ids.len(), seats.len());

            // Every generated id shows up on exactly one element in the output.
            let root = Element::parse(buffer.as_slice()).unwrap();
            let mut rects = Vec::new();
            elements_of(&root, "rect", &mut rects);
            prop_assert_eq!(rects.len(), seats.len());
            for (elem, marker) in rects.iter().zip(&seats) {
                prop_assert_eq!(&elem.attributes["id"], &marker.id.to_string());
                prop_assert_eq!(&elem.attributes["fill"], SANITIZED_FILL);
            }
        }
    }
}
