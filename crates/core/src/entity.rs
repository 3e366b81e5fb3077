use uuid::Uuid;

/// Owning organization. Every record and query is scoped to one tenant.
pub type TenantId = Uuid;

pub type ScheduleId = Uuid;
pub type CompletionId = Uuid;
pub type TemplateId = Uuid;
pub type AssetId = Uuid;
pub type LocationId = Uuid;
pub type VendorId = Uuid;
pub type UserId = Uuid;

/// Work-order (ticket) reference owned by the ticket service.
pub type TicketId = Uuid;
