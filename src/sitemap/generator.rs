//! sitemap.xml and robots.txt generation from the configured page list.

use chrono::Utc;

use crate::config::schema::SiteConfig;

/// Render the sitemap. The root page gets top priority; everything else a
/// flat default, which is all a site this size needs.
pub fn sitemap_xml(site: &SiteConfig) -> String {
    let today = Utc::now().format("%Y-%m-%d");
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for page in &site.pages {
        let loc = if page == "/" {
            site.base_url.clone()
        } else {
            format!("{}{}", site.base_url, page)
        };
        let priority = if page == "/" { "1.0" } else { "0.8" };
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>monthly</changefreq>\n    <priority>{}</priority>\n  </url>\n",
            loc, today, priority
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Render robots.txt pointing crawlers at the sitemap.
pub fn robots_txt(site: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /api/\n\nSitemap: {}/sitemap.xml\n",
        site.base_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            base_url: "https://example.com".into(),
            pages: vec!["/".into(), "/servicios".into()],
        }
    }

    #[test]
    fn test_sitemap_lists_all_pages() {
        let xml = sitemap_xml(&site());
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<loc>https://example.com</loc>"));
        assert!(xml.contains("<loc>https://example.com/servicios</loc>"));
        assert_eq!(xml.matches("<url>").count(), 2);
    }

    #[test]
    fn test_root_has_top_priority() {
        let xml = sitemap_xml(&site());
        let root_pos = xml.find("<loc>https://example.com</loc>").unwrap();
        let priority_pos = xml[root_pos..].find("<priority>1.0</priority>").unwrap();
        assert!(priority_pos < xml[root_pos..].find("</url>").unwrap());
    }

    #[test]
    fn test_robots_points_at_sitemap() {
        let robots = robots_txt(&site());
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
        assert!(robots.contains("Disallow: /api/"));
    }
}
