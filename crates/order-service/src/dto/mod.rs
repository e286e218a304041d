//! DTO 模块
//!
//! 包含所有请求和响应的数据传输对象

pub mod request;
pub mod response;

pub use request::{
    AddToCartRequest, ClaimFreeDrinkRequest, ContactRequest, CreateAdminRequest,
    CreateOrderRequest, LoginRequest, OrderItemRequest, RegisterRequest, UpdateCartItemRequest,
    UpdateOrderStatusRequest, UpdatePaymentStatusRequest,
};

pub use response::{
    AdminAccountDto, ApiResponse, AuthUserDto, BestSellerDto, CartItemDto, CustomerDto,
    DashboardStats, LoginResponse, OrderDto, OrderItemDto, OrderSummaryDto, PointsBalanceDto,
};
