/// Split a package identifier into `(base_name, version)`.
///
/// The boundary is the first `-` immediately followed by an ASCII digit:
/// `"foo-bar-2.3.1"` gives `("foo-bar", "2.3.1")`. Without such a boundary
/// the whole identifier is the base name and the version is empty.
///
/// This is a plain scan, not a version grammar. Names whose base part itself
/// contains `-<digit>` (e.g. `"gtk-2-engines-1.0"`) split at that first
/// occurrence.
pub fn split_name(name: &str) -> (&str, &str) {
    let bytes = name.as_bytes();
    for i in 1..bytes.len() {
        if bytes[i].is_ascii_digit() && bytes[i - 1] == b'-' {
            return (&name[..i - 1], &name[i..]);
        }
    }
    (name, "")
}
