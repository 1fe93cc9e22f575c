//! LMS fetcher.
//!
//! Every LMS page is served by one AJAX dispatcher at the service root;
//! the `action` form field selects the page. Responses are HTML fragments
//! handed to the injected parser set.

use std::sync::Arc;

use unipal_core::{
    ClassContentListing, ClassDirectoryListing, ManaboNews, ManaboTimetable, PageParser,
};
use unipal_fetch::HttpRequest;

use crate::error::ProviderError;
use crate::session::PortalSession;

/// Parser set for the LMS pages.
pub trait ManaboParsers: Send + Sync {
    /// Timetable grid parser.
    fn timetable(&self) -> &dyn PageParser<ManaboTimetable>;
    /// Class directory listing parser.
    fn class_directories(&self) -> &dyn PageParser<ClassDirectoryListing>;
    /// Class content listing parser.
    fn class_contents(&self) -> &dyn PageParser<ClassContentListing>;
    /// News list parser.
    fn news(&self) -> &dyn PageParser<ManaboNews>;
}

/// Authenticated LMS client.
pub struct ManaboClient<P> {
    session: Arc<PortalSession>,
    parsers: P,
}

impl<P: ManaboParsers> ManaboClient<P> {
    /// Creates the client over a shared LMS session.
    pub fn new(session: Arc<PortalSession>, parsers: P) -> Self {
        Self { session, parsers }
    }

    async fn post_action(
        &self,
        user_id: &str,
        password: &str,
        fields: Vec<(String, String)>,
    ) -> Result<String, ProviderError> {
        let request = HttpRequest::post_form(self.session.url("/"), fields);
        let response = self.session.request(user_id, password, request).await?;
        Ok(response.body)
    }

    /// Fetches and parses the timetable grid.
    pub async fn timetable(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<ManaboTimetable, ProviderError> {
        let body = self
            .post_action(
                user_id,
                password,
                vec![("action".into(), "glexa_ajax_timetable_view".into())],
            )
            .await?;
        Ok(self.parsers.timetable().parse(&body)?)
    }

    /// Fetches the directory listing of a class. `"0"` is the class top.
    pub async fn class_directory(
        &self,
        user_id: &str,
        password: &str,
        class_id: &str,
        directory_id: &str,
    ) -> Result<ClassDirectoryListing, ProviderError> {
        let body = self
            .post_action(
                user_id,
                password,
                vec![
                    ("class_id".into(), class_id.into()),
                    ("directory_id".into(), directory_id.into()),
                    ("action".into(), "glexa_ajax_class_directory_list".into()),
                ],
            )
            .await?;
        Ok(self.parsers.class_directories().parse(&body)?)
    }

    /// Fetches the content list of one class directory.
    pub async fn class_content(
        &self,
        user_id: &str,
        password: &str,
        class_id: &str,
        directory_id: &str,
    ) -> Result<ClassContentListing, ProviderError> {
        let body = self
            .post_action(
                user_id,
                password,
                vec![
                    ("class_id".into(), class_id.into()),
                    ("directory_id".into(), directory_id.into()),
                    ("action".into(), "glexa_ajax_class_content_list".into()),
                ],
            )
            .await?;
        Ok(self.parsers.class_contents().parse(&body)?)
    }

    /// Fetches the LMS news list.
    pub async fn news(&self, user_id: &str, password: &str) -> Result<ManaboNews, ProviderError> {
        let body = self
            .post_action(
                user_id,
                password,
                vec![("action".into(), "glexa_ajax_news_list".into())],
            )
            .await?;
        Ok(self.parsers.news().parse(&body)?)
    }
}
