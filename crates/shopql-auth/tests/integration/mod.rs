mod login_flow;
mod revalidation;
