use std::time::Duration;
use url::Url;

/// A listing category: a human-readable name and the search URL that
/// enumerates its items. Pagination appends `&page=N`.
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub url: String,
}

impl Category {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    pub fn page_url(&self, page: usize) -> String {
        format!("{}&page={}", self.url, page)
    }
}

/// Policy and catalog configuration for one walk. The category list is
/// injected here rather than baked into the walker so tests can run
/// against a tiny catalog.
#[derive(Debug, Clone)]
pub struct WalkConfig {
    pub categories: Vec<Category>,
    pub base_url: Url,
    pub affiliate_tag: String,
    pub max_pages_per_category: usize,
    /// Newly saved items per category before moving on.
    pub per_category_quota: usize,
    /// 1 = strictly sequential item processing; >1 enables a small
    /// bounded fan-out per page.
    pub item_concurrency: usize,
    pub inter_item_delay: Duration,
    pub inter_page_delay: Duration,
    pub inter_category_delay: Duration,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            base_url: Url::parse("https://www.amazon.in").unwrap(),
            affiliate_tag: "cartiva-21".to_string(),
            max_pages_per_category: 3,
            per_category_quota: 10,
            item_concurrency: 1,
            inter_item_delay: Duration::from_millis(1500),
            inter_page_delay: Duration::from_secs(6),
            inter_category_delay: Duration::from_secs(10),
        }
    }
}

impl WalkConfig {
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_affiliate_tag(mut self, tag: &str) -> Self {
        self.affiliate_tag = tag.to_string();
        self
    }

    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages_per_category = pages;
        self
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.per_category_quota = quota;
        self
    }

    pub fn with_item_concurrency(mut self, concurrency: usize) -> Self {
        self.item_concurrency = concurrency.max(1);
        self
    }

    pub fn with_inter_item_delay(mut self, delay: Duration) -> Self {
        self.inter_item_delay = delay;
        self
    }

    pub fn with_inter_page_delay(mut self, delay: Duration) -> Self {
        self.inter_page_delay = delay;
        self
    }

    pub fn with_inter_category_delay(mut self, delay: Duration) -> Self {
        self.inter_category_delay = delay;
        self
    }
}

/// Default category catalog: budget-bounded searches per department.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "Electronics",
            "https://www.amazon.in/s?i=electronics&rh=p_36%3A-500000",
        ),
        Category::new(
            "Mobile Phones",
            "https://www.amazon.in/s?i=mobile&rh=p_36%3A-20000",
        ),
        Category::new("Books", "https://www.amazon.in/s?i=stripbooks&rh=p_36%3A-500"),
        Category::new(
            "Home & Kitchen",
            "https://www.amazon.in/s?i=garden&rh=p_36%3A-5000",
        ),
        Category::new("Fashion", "https://www.amazon.in/s?i=fashion&rh=p_36%3A-2000"),
        Category::new("Beauty", "https://www.amazon.in/s?i=beauty&rh=p_36%3A-1000"),
        Category::new(
            "Toys",
            "https://www.amazon.in/s?i=toys-and-games&rh=p_36%3A-1000",
        ),
        Category::new("Sports", "https://www.amazon.in/s?i=sports&rh=p_36%3A-3000"),
        Category::new(
            "Computers",
            "https://www.amazon.in/s?i=computers&rh=p_36%3A-50000",
        ),
        Category::new(
            "Gaming Consoles",
            "https://www.amazon.in/s?i=videogames&rh=p_36%3A-50000,n%3A1984443031",
        ),
        Category::new(
            "Headphones & Earphones",
            "https://www.amazon.in/s?i=electronics&rh=p_36%3A-20000,n%3A1389432031",
        ),
        Category::new(
            "Smart Watches",
            "https://www.amazon.in/s?i=electronics&rh=p_36%3A-30000,n%3A1571271031",
        ),
    ]
}
