use sea_orm::{
    ConnectionTrait, DbErr, EntityTrait, FromQueryResult, ItemsAndPagesNumber, PaginatorTrait,
    Select,
};
use serde::Serialize;

/// Number of posts on every list page
pub const PAGE_SIZE: u64 = 10;

/// Page number as it came from the query string.
///
/// Absent or non-numeric values mean the first page; numbers outside of
/// `1..=num_pages` are clamped to the nearest existing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest(Option<i64>);

impl PageRequest {
    pub fn parse(raw: Option<&str>) -> Self {
        Self(raw.and_then(|r| r.trim().parse().ok()))
    }

    pub fn number(number: i64) -> Self {
        Self(Some(number))
    }

    /// Requested number with everything below the first page folded into 1.
    /// Numbers past the last page are kept, since that needs a count.
    pub fn normalized(self) -> i64 {
        self.0.unwrap_or(1).max(1)
    }

    /// Returns 1-based page number that will actually be served
    pub fn resolve(self, num_pages: u64) -> u64 {
        let last = num_pages.max(1);

        match self.0 {
            Some(n) if n > 1 => (n as u64).min(last),
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based number of this page
    pub number: u64,
    pub num_pages: u64,
    /// Total number of items over all pages
    pub count: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    fn new(items: Vec<T>, number: u64, num_pages: u64, count: u64) -> Self {
        let num_pages = num_pages.max(1);

        Self {
            items,
            number,
            num_pages,
            count,
            has_previous: number > 1,
            has_next: number < num_pages,
        }
    }

    /// Slices an already materialized sequence
    pub fn from_items(mut items: Vec<T>, page_size: u64, request: PageRequest) -> Self {
        let page_size = page_size.max(1);
        let count = items.len() as u64;
        let num_pages = (count + page_size - 1) / page_size;
        let number = request.resolve(num_pages);

        let start = ((number - 1) * page_size).min(count) as usize;
        let end = (number * page_size).min(count) as usize;
        let items = items.drain(start..end).collect();

        Self::new(items, number, num_pages, count)
    }

    pub fn map<U>(mut self, f: impl FnMut(T) -> U) -> Page<U> {
        let items = std::mem::take(&mut self.items).into_iter().map(f).collect();

        self.with_items(items)
    }

    /// Keeps page position, swapping its items
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }
}

/// Fetches one page of `select` from database, using `COUNT` and `LIMIT/OFFSET`.
pub async fn fetch_page<'db, C, E, M>(
    select: Select<E>,
    db: &'db C,
    page_size: u64,
    request: PageRequest,
) -> Result<Page<M>, DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait<Model = M>,
    M: FromQueryResult + Sized + Send + Sync + 'db,
{
    let paginator = select.paginate(db, page_size.max(1));
    let ItemsAndPagesNumber {
        number_of_items,
        number_of_pages,
    } = paginator.num_items_and_pages().await?;

    let number = request.resolve(number_of_pages);
    let items = paginator.fetch_page(number - 1).await?;

    Ok(Page::new(items, number, number_of_pages, number_of_items))
}
