//! Paginated media gallery
//!
//! Every fetch is tagged with the page it was issued for. A response is only
//! applied while that page is still the one being shown, so a slow response
//! for an earlier page cannot overwrite a newer one.
//!
//! The page is kept within `[1, max(1, totalPages)]` of the latest listing.
//! When a listing reports fewer pages than the one being shown, the viewer
//! moves to the last page and fetches it.

use common::models::{AcceptFilter, ListingMeta, ListingPage, MediaCategory, MediaItem};
use tracing::{debug, warn};

use crate::{error::ClientError, transport::MediaApi};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Message shown when a listing has nothing to display
pub const EMPTY_MESSAGE: &str = "No media files found";

/// Embedding options for [`GalleryViewer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryProps {
    pub accept: AcceptFilter,
    pub limit: u32,
    pub selected_url: Option<String>,
}

impl Default for GalleryProps {
    fn default() -> Self {
        Self {
            accept: AcceptFilter::default(),
            limit: DEFAULT_PAGE_SIZE,
            selected_url: None,
        }
    }
}

/// A listing fetch, tagged with its page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub async fn send(self, api: &dyn MediaApi) -> Result<ListingPage, ClientError> {
        api.list(self.page, self.limit).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile<'a> {
    pub url: &'a str,
    pub filename: &'a str,
    pub kind: Option<MediaCategory>,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Pagination {
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}

/// Render snapshot of the gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryView<'a> {
    Loading,
    Error { message: &'a str },
    Empty,
    Grid {
        tiles: Vec<Tile<'a>>,
        /// Present only when there is more than one page
        pagination: Option<Pagination>,
    },
}

type MediaSelectCallback = Box<dyn FnMut(&str) + Send>;

pub struct GalleryViewer {
    props: GalleryProps,
    on_media_select: MediaSelectCallback,
    items: Vec<MediaItem>,
    page: u32,
    meta: ListingMeta,
    loading: bool,
    error: Option<String>,
}

impl GalleryViewer {
    /// Create a viewer on page 1; call [`GalleryViewer::load`] or send
    /// [`GalleryViewer::request_page`] to populate it
    pub fn new(props: GalleryProps, on_media_select: impl FnMut(&str) + Send + 'static) -> Self {
        let meta = ListingMeta {
            page: 1,
            limit: props.limit,
            total: 0,
            total_pages: 1,
        };

        Self {
            props,
            on_media_select: Box::new(on_media_select),
            items: Vec::new(),
            page: 1,
            meta,
            loading: true,
            error: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.meta.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.meta.last_page()
    }

    /// Start a fetch of the current page
    pub fn request_page(&mut self) -> PageRequest {
        self.loading = true;
        self.error = None;

        PageRequest {
            page: self.page,
            limit: self.props.limit,
        }
    }

    /// Move to the next page; `None` at the last page
    pub fn request_next(&mut self) -> Option<PageRequest> {
        self.move_to(self.page.saturating_add(1))
    }

    /// Move to the previous page; `None` at page 1
    pub fn request_previous(&mut self) -> Option<PageRequest> {
        self.move_to(self.page.saturating_sub(1))
    }

    fn move_to(&mut self, page: u32) -> Option<PageRequest> {
        let target = self.meta.clamp_page(page);
        if target == self.page {
            return None;
        }
        self.page = target;
        Some(self.request_page())
    }

    /// Re-issue the fetch for the current page
    pub fn request_retry(&mut self) -> PageRequest {
        self.request_page()
    }

    /// Apply a fetch result; returns false when the response is stale.
    ///
    /// If the listing has fewer pages than the requested one, the viewer
    /// moves to its last page and stays loading; `page()` then differs from
    /// `request.page` and the host should send [`GalleryViewer::request_page`].
    pub fn apply(&mut self, request: PageRequest, result: Result<ListingPage, ClientError>) -> bool {
        if request.page != self.page {
            debug!(
                "Discarding stale listing for page {} (showing page {})",
                request.page, self.page
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(listing) => {
                self.items = listing.data;
                self.meta = listing.meta;
                self.error = None;

                let clamped = self.meta.clamp_page(self.page);
                if clamped != self.page {
                    debug!(
                        "Page {} is past the last page, moving to page {}",
                        self.page, clamped
                    );
                    self.page = clamped;
                    self.loading = true;
                }
            }
            Err(e) => {
                warn!("Failed to fetch media page {}: {}", request.page, e);
                self.error = Some(e.to_string());
            }
        }

        true
    }

    async fn fetch(&mut self, request: PageRequest, api: &dyn MediaApi) {
        let result = request.send(api).await;
        if self.apply(request, result) && self.page != request.page {
            let request = self.request_page();
            let result = request.send(api).await;
            self.apply(request, result);
        }
    }

    pub async fn load(&mut self, api: &dyn MediaApi) {
        let request = self.request_page();
        self.fetch(request, api).await;
    }

    pub async fn next(&mut self, api: &dyn MediaApi) {
        if let Some(request) = self.request_next() {
            self.fetch(request, api).await;
        }
    }

    pub async fn previous(&mut self, api: &dyn MediaApi) {
        if let Some(request) = self.request_previous() {
            self.fetch(request, api).await;
        }
    }

    pub async fn retry(&mut self, api: &dyn MediaApi) {
        let request = self.request_retry();
        self.fetch(request, api).await;
    }

    /// Items of the current page whose category the filter accepts
    pub fn visible_items(&self) -> impl Iterator<Item = &MediaItem> + '_ {
        self.items
            .iter()
            .filter(|item| self.props.accept.accepts_mime(&item.mimetype))
    }

    pub fn is_selected(&self, item: &MediaItem) -> bool {
        self.props.selected_url.as_deref() == Some(item.url.as_str())
    }

    pub fn set_selected_url(&mut self, url: Option<String>) {
        self.props.selected_url = url;
    }

    /// Highlight `url` and report it to the host
    pub fn select(&mut self, url: &str) {
        self.set_selected_url(Some(url.to_string()));
        (self.on_media_select)(url);
    }

    pub fn view(&self) -> GalleryView<'_> {
        if self.loading && self.items.is_empty() {
            return GalleryView::Loading;
        }

        if let Some(message) = &self.error {
            return GalleryView::Error {
                message: message.as_str(),
            };
        }

        let tiles: Vec<_> = self
            .visible_items()
            .map(|item| Tile {
                url: &item.url,
                filename: &item.filename,
                kind: item.category(),
                is_selected: self.is_selected(item),
            })
            .collect();

        if tiles.is_empty() {
            return GalleryView::Empty;
        }

        let pagination = (self.meta.total_pages > 1).then(|| Pagination {
            page: self.page,
            total_pages: self.meta.total_pages,
            has_previous: self.has_previous(),
            has_next: self.has_next(),
        });

        GalleryView::Grid { tiles, pagination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::UploadRequest;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    };

    /// Serves `total` items split across pages, alternating images and videos
    struct FakeApi {
        total: AtomicU64,
        fail: bool,
        requested: Mutex<Vec<u32>>,
    }

    impl FakeApi {
        fn with_items(total: u64) -> Self {
            Self {
                total: AtomicU64::new(total),
                fail: false,
                requested: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::with_items(0)
            }
        }

        fn set_total(&self, total: u64) {
            self.total.store(total, Ordering::SeqCst);
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    fn item(n: u64) -> MediaItem {
        let (ext, mime) = if n % 2 == 0 {
            ("png", "image/png")
        } else {
            ("mp4", "video/mp4")
        };
        MediaItem {
            id: format!("med_{n}"),
            url: format!("https://cdn.example.com/uploads/{n}.{ext}"),
            filename: format!("{n}.{ext}"),
            mimetype: mime.to_string(),
            size: 1024,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn listing(page: u32, limit: u32, total: u64) -> ListingPage {
        let start = u64::from(page.saturating_sub(1)) * u64::from(limit);
        let end = (start + u64::from(limit)).min(total);
        ListingPage {
            data: (start..end).map(item).collect(),
            meta: ListingMeta::new(page, limit, total),
        }
    }

    #[async_trait]
    impl MediaApi for FakeApi {
        async fn upload(&self, _request: UploadRequest) -> Result<String, ClientError> {
            unreachable!("the gallery never uploads")
        }

        async fn list(&self, page: u32, limit: u32) -> Result<ListingPage, ClientError> {
            self.requested.lock().unwrap().push(page);
            if self.fail {
                return Err(ClientError::Server {
                    status: 500,
                    message: "Failed to retrieve media".to_string(),
                });
            }
            Ok(listing(page, limit, self.total.load(Ordering::SeqCst)))
        }
    }

    fn viewer(props: GalleryProps) -> (GalleryViewer, Arc<Mutex<Vec<String>>>) {
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = selected.clone();
        let viewer = GalleryViewer::new(props, move |url| sink.lock().unwrap().push(url.to_string()));
        (viewer, selected)
    }

    #[tokio::test]
    async fn test_navigation_clamps_at_both_ends() {
        let api = FakeApi::with_items(45);
        let (mut gallery, _) = viewer(GalleryProps::default());
        gallery.load(&api).await;
        assert_eq!(gallery.total_pages(), 3);

        for _ in 0..5 {
            gallery.next(&api).await;
            assert!((1..=3).contains(&gallery.page()));
        }
        assert_eq!(gallery.page(), 3);
        assert!(!gallery.has_next());

        for _ in 0..5 {
            gallery.previous(&api).await;
            assert!((1..=3).contains(&gallery.page()));
        }
        assert_eq!(gallery.page(), 1);
        assert!(!gallery.has_previous());

        // boundary presses issue no request
        assert_eq!(api.requested(), vec![1, 2, 3, 2, 1]);
    }

    #[tokio::test]
    async fn test_next_never_passes_last_page() {
        let api = FakeApi::with_items(40);
        let (mut gallery, _) = viewer(GalleryProps::default());
        gallery.load(&api).await;
        gallery.next(&api).await;

        assert_eq!(gallery.page(), 2);
        assert_eq!(gallery.request_next(), None);
        assert!(!api.requested().contains(&3));
    }

    #[test]
    fn test_shrunken_listing_moves_to_last_page() {
        let (mut gallery, _) = viewer(GalleryProps::default());
        let first = gallery.request_page();
        gallery.apply(first, Ok(listing(1, 20, 60)));
        gallery.request_next().unwrap();
        let to_three = gallery.request_next().unwrap();

        // items were removed upstream while page 3 was in flight
        assert!(gallery.apply(to_three, Ok(listing(3, 20, 40))));

        assert_eq!(gallery.page(), 2);
        assert_eq!(gallery.total_pages(), 2);
        assert!(gallery.page() <= gallery.total_pages());
        assert!(!gallery.has_next());
        assert_eq!(gallery.request_next(), None);
        assert!(gallery.is_loading());

        let refetch = gallery.request_page();
        assert_eq!(refetch.page, 2);
        gallery.apply(refetch, Ok(listing(2, 20, 40)));
        let GalleryView::Grid { pagination, .. } = gallery.view() else {
            panic!("expected a grid");
        };
        assert_eq!(pagination.unwrap().label(), "Page 2 of 2");
    }

    #[tokio::test]
    async fn test_fetch_follows_clamped_page() {
        let api = FakeApi::with_items(60);
        let (mut gallery, _) = viewer(GalleryProps::default());
        gallery.load(&api).await;
        gallery.next(&api).await;
        gallery.next(&api).await;
        assert_eq!(gallery.page(), 3);

        api.set_total(40);
        gallery.retry(&api).await;

        assert_eq!(api.requested(), vec![1, 2, 3, 3, 2]);
        assert_eq!(gallery.page(), 2);
        assert!(!gallery.is_loading());
        gallery.previous(&api).await;
        assert_eq!(gallery.page(), 1);
    }

    #[tokio::test]
    async fn test_empty_listing_has_single_page() {
        let api = FakeApi::with_items(0);
        let (mut gallery, _) = viewer(GalleryProps::default());
        gallery.load(&api).await;

        assert_eq!(gallery.total_pages(), 0);
        assert_eq!(gallery.request_next(), None);
        assert_eq!(gallery.request_previous(), None);
        assert_eq!(gallery.page(), 1);
        assert_eq!(gallery.view(), GalleryView::Empty);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let (mut gallery, _) = viewer(GalleryProps::default());
        let first = gallery.request_page();
        assert!(gallery.apply(first, Ok(listing(1, 20, 60))));

        let to_two = gallery.request_next().unwrap();
        let to_three = gallery.request_next().unwrap();

        assert!(gallery.apply(to_three, Ok(listing(3, 20, 60))));
        assert!(!gallery.apply(to_two, Ok(listing(2, 20, 60))));

        assert_eq!(gallery.page(), 3);
        let GalleryView::Grid { tiles, pagination } = gallery.view() else {
            panic!("expected a grid");
        };
        assert_eq!(tiles[0].filename, "40.png");
        assert_eq!(pagination.unwrap().label(), "Page 3 of 3");
    }

    #[test]
    fn test_filter_keeps_only_accepted_categories() {
        let mut page = listing(1, 20, 4);

        let (mut images, _) = viewer(GalleryProps {
            accept: AcceptFilter::empty().with(MediaCategory::Image, [".png"]),
            ..Default::default()
        });
        let request = images.request_page();
        images.apply(request, Ok(page.clone()));
        assert!(images
            .visible_items()
            .all(|item| item.category() == Some(MediaCategory::Image)));
        assert_eq!(images.visible_items().count(), 2);

        let (mut videos, _) = viewer(GalleryProps {
            accept: AcceptFilter::empty().with(MediaCategory::Video, [".mp4"]),
            ..Default::default()
        });
        page.data.push(MediaItem {
            mimetype: "application/pdf".to_string(),
            ..item(99)
        });
        let request = videos.request_page();
        videos.apply(request, Ok(page));
        assert!(videos
            .visible_items()
            .all(|item| item.category() == Some(MediaCategory::Video)));
        assert_eq!(videos.visible_items().count(), 2);
    }

    #[test]
    fn test_loading_only_while_empty() {
        let (mut gallery, _) = viewer(GalleryProps::default());
        assert_eq!(gallery.view(), GalleryView::Loading);

        let request = gallery.request_page();
        gallery.apply(request, Ok(listing(1, 20, 30)));
        assert!(matches!(gallery.view(), GalleryView::Grid { .. }));

        gallery.request_next();
        assert!(gallery.is_loading());
        assert!(matches!(gallery.view(), GalleryView::Grid { .. }));
    }

    #[tokio::test]
    async fn test_retry_reissues_same_page() {
        let api = FakeApi::failing();
        let (mut gallery, _) = viewer(GalleryProps::default());
        gallery.load(&api).await;

        assert_eq!(
            gallery.view(),
            GalleryView::Error {
                message: "Failed to retrieve media"
            }
        );

        gallery.retry(&api).await;
        assert_eq!(api.requested(), vec![1, 1]);
        assert_eq!(gallery.page(), 1);
    }

    #[tokio::test]
    async fn test_selection_highlight_and_callback() {
        let api = FakeApi::with_items(4);
        let (mut gallery, selected) = viewer(GalleryProps {
            selected_url: Some("https://cdn.example.com/uploads/2.png".to_string()),
            ..Default::default()
        });
        gallery.load(&api).await;

        let GalleryView::Grid { tiles, pagination } = gallery.view() else {
            panic!("expected a grid");
        };
        assert_eq!(pagination, None);
        let highlighted: Vec<_> = tiles.iter().filter(|t| t.is_selected).map(|t| t.url).collect();
        assert_eq!(highlighted, vec!["https://cdn.example.com/uploads/2.png"]);

        gallery.select("https://cdn.example.com/uploads/3.mp4");
        assert_eq!(
            *selected.lock().unwrap(),
            vec!["https://cdn.example.com/uploads/3.mp4".to_string()]
        );

        let GalleryView::Grid { tiles, .. } = gallery.view() else {
            panic!("expected a grid");
        };
        let highlighted: Vec<_> = tiles.iter().filter(|t| t.is_selected).map(|t| t.url).collect();
        assert_eq!(highlighted, vec!["https://cdn.example.com/uploads/3.mp4"]);
    }
}
