/// Count of UTF-8 code points in `s`. `&str` is validated UTF-8 by
/// construction, so this is total. Called once per String/Atom creation;
/// the result is cached in the object.
pub fn len(s: &str) -> usize {
    s.chars().count()
}
