//! Fixed-size paging over ordered sequences.
//!
//! Page numbers are 1-indexed. A request that isn't a number falls back to the
//! first page; a number outside `1..=num_pages` clamps to the last page. An
//! empty sequence still has one (empty) page.

pub const POSTS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: usize,
    per_page: usize,
}

/// Where a page sits within the whole sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: usize,
    pub num_pages: usize,
    pub offset: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub window: PageWindow,
}

impl Paginator {
    pub fn new(count: usize, per_page: usize) -> Self {
        Paginator { count, per_page: per_page.max(1) }
    }

    pub fn num_pages(&self) -> usize {
        self.count.div_ceil(self.per_page).max(1)
    }

    /// Resolves a raw `?page=` value to a concrete page.
    pub fn get_page(&self, requested: Option<&str>) -> PageWindow {
        let num_pages = self.num_pages();
        let number = match requested.map(str::trim).map(str::parse::<i128>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n < 1 || n > num_pages as i128 => num_pages,
            Some(Ok(n)) => n as usize,
        };

        let offset = (number - 1) * self.per_page;
        let len = self.count.saturating_sub(offset).min(self.per_page);
        PageWindow { number, num_pages, offset, len }
    }
}

/// A cache-friendly form of a raw `?page=` value, computed without the count.
///
/// Values [`Paginator::get_page`] sends to the first page become `"1"` and
/// values it clamps from below become `"last"`, so junk never yields new keys.
pub fn page_key(requested: Option<&str>) -> String {
    match requested.map(str::trim).map(str::parse::<i128>) {
        None | Some(Err(_)) => "1".to_owned(),
        Some(Ok(n)) if n < 1 => "last".to_owned(),
        Some(Ok(n)) => n.to_string(),
    }
}

impl PageWindow {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = (self.offset + self.len).min(items.len());
        &items[start..end]
    }
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Pages an in-memory sequence.
pub fn paginate<T>(mut items: Vec<T>, per_page: usize, requested: Option<&str>) -> Page<T> {
    let window = Paginator::new(items.len(), per_page).get_page(requested);
    items.truncate(window.offset + window.len);
    let items = items.split_off(window.offset);
    Page { items, window }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn fourteen_items_split_ten_and_four() {
        let items: Vec<u32> = (0..14).collect();

        let first = paginate(items.clone(), POSTS_PER_PAGE, None);
        assert_eq!(first.len(), 10);
        assert_eq!(first.window.num_pages, 2);
        assert!(first.window.has_next());
        assert!(!first.window.has_previous());

        let second = paginate(items, POSTS_PER_PAGE, Some("2"));
        assert_eq!(second.items, vec![10, 11, 12, 13]);
        assert!(!second.window.has_next());
        assert!(second.window.has_previous());
    }

    #[test]
    fn bad_page_numbers() {
        let paginator = Paginator::new(25, 10);
        assert_eq!(paginator.get_page(None).number, 1);
        assert_eq!(paginator.get_page(Some("")).number, 1);
        assert_eq!(paginator.get_page(Some("abc")).number, 1);
        assert_eq!(paginator.get_page(Some("2.5")).number, 1);
        assert_eq!(paginator.get_page(Some("99")).number, 3);
        assert_eq!(paginator.get_page(Some("0")).number, 3);
        assert_eq!(paginator.get_page(Some("-4")).number, 3);
        assert_eq!(paginator.get_page(Some("99999999999999999999")).number, 3);
    }

    #[test]
    fn page_keys_collapse_equivalent_requests() {
        assert_eq!(page_key(None), "1");
        assert_eq!(page_key(Some("junk42")), "1");
        assert_eq!(page_key(Some("")), "1");
        assert_eq!(page_key(Some("007")), "7");
        assert_eq!(page_key(Some("0")), "last");
        assert_eq!(page_key(Some("-3")), "last");
    }

    #[test]
    fn empty_sequence_has_one_empty_page() {
        let page = paginate(Vec::<u8>::new(), 10, Some("3"));
        assert_eq!(page.window.number, 1);
        assert_eq!(page.window.num_pages, 1);
        assert!(page.is_empty());
        assert!(!page.window.has_next());
    }

    #[test]
    fn pages_reassemble_the_sequence() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let count = rng.random_range(1..120usize);
            let per_page = rng.random_range(1..25usize);
            let items: Vec<usize> = (0..count).collect();

            let num_pages = Paginator::new(count, per_page).num_pages();
            assert_eq!(num_pages, count.div_ceil(per_page));

            let mut joined = Vec::with_capacity(count);
            for number in 1..=num_pages {
                let page = paginate(items.clone(), per_page, Some(&number.to_string()));
                assert_eq!(page.window.number, number);
                assert_eq!(page.items.as_slice(), page.window.slice(&items));
                joined.extend(page.items);
            }
            assert_eq!(joined, items);
        }
    }
}
