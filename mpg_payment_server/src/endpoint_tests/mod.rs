mod notifications;
mod payments;
