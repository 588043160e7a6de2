//! Key-based splice helpers for optimistic updates.
//!
//! 順序付きのコレクションを key で探して置き換える / 取り除く / 先頭に足す。

/// `key` に一致する最初の要素を `replace(&old)` で置き換える
///
/// 一致しなければ何もせず `false`。
pub fn replace_by_key<T, K, F, R>(items: &mut [T], key: &K, key_of: F, replace: R) -> bool
where
    K: PartialEq + ?Sized,
    F: Fn(&T) -> &K,
    R: FnOnce(&T) -> T,
{
    match items.iter_mut().find(|item| key_of(item) == key) {
        Some(slot) => {
            *slot = replace(slot);
            true
        }
        None => false,
    }
}

/// `key` に一致する最初の要素を取り除いて返す
pub fn remove_by_key<T, K, F>(items: &mut Vec<T>, key: &K, key_of: F) -> Option<T>
where
    K: PartialEq + ?Sized,
    F: Fn(&T) -> &K,
{
    let index = items.iter().position(|item| key_of(item) == key)?;
    Some(items.remove(index))
}

pub fn prepend<T>(items: &mut Vec<T>, item: T) {
    items.insert(0, item);
}
