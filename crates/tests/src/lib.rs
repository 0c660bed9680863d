
#[cfg(test)]
mod request_create_tests;
#[cfg(test)]
mod booking_tests;
#[cfg(test)]
mod completion_tests;
#[cfg(test)]
mod listing_tests;
