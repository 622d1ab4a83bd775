use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use crate::types::{Container, ContainerSelector, ImageTask, SelectorKind};

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| Error::InvalidConfiguration(format!("選擇器解析失敗: {:?}", e)))
}

/// 取得網頁並找出畫廊容器
///
/// 網頁抓取失敗、找不到容器、容器內沒有 `<img>` 都會結束整次執行。
pub async fn fetch_container(
    fetcher: &dyn Fetcher,
    url: &str,
    selector: &ContainerSelector,
) -> Result<Container> {
    let html = fetcher.fetch_page(url).await?;
    find_container(&html, selector)
}

/// 在 HTML 中依選擇器找出第一個符合的容器（文件順序）
pub fn find_container(html: &str, selector: &ContainerSelector) -> Result<Container> {
    let document = Html::parse_document(html);
    let all = parse_selector("*")?;
    let img = parse_selector("img")?;

    let container = document
        .select(&all)
        .find(|element| matches_selector(element, selector))
        .ok_or_else(|| Error::ContainerNotFound {
            kind: selector.kind,
            value: selector.value.clone(),
        })?;

    let image_count = container.select(&img).count();
    if image_count == 0 {
        return Err(Error::NoImages);
    }

    Ok(Container {
        html: container.html(),
        image_count,
    })
}

fn matches_selector(element: &ElementRef, selector: &ContainerSelector) -> bool {
    let value = element.value();
    match selector.kind {
        SelectorKind::Id => value.id() == Some(selector.value.as_str()),
        SelectorKind::Class => {
            value.classes().any(|class| class == selector.value)
                || value
                    .attr("class")
                    .is_some_and(|class| class.trim() == selector.value.trim())
        }
    }
}

/// 依文件順序取出容器內所有圖片的絕對 URL
///
/// `src` 缺少或為空的 `<img>` 直接略過。
pub fn extract_image_urls(container: &Container, page_url: &str) -> Result<Vec<ImageTask>> {
    let base = Url::parse(page_url)?;
    let fragment = Html::parse_fragment(&container.html);
    let img = parse_selector("img")?;

    let mut tasks = Vec::new();

    for element in fragment.select(&img) {
        let Some(src) = element.value().attr("src").map(str::trim) else {
            continue;
        };
        if src.is_empty() {
            continue;
        }

        match base.join(src) {
            Ok(url) => tasks.push(ImageTask {
                index: tasks.len(),
                url: url.to_string(),
            }),
            Err(e) => tracing::warn!("略過無法解析的圖片位址 {}: {}", src, e),
        }
    }

    Ok(tasks)
}
